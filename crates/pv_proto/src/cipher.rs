//! Dual-recipient message sealing.
//!
//! One plaintext is sealed twice: once under a key derived from the
//! sender id and once under a key derived from the recipient id. Either
//! party can recover the message later knowing only its own id; no key
//! exchange happens. The scheme inherits the identifiers' secrecy model:
//! whoever knows a user id can derive that user's key, so this protects
//! against the transport, not against a peer who learns the ids.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;

use pv_crypto::{derive_key, mac, seal, KeyRotation};

use crate::envelope::SealedEnvelope;
use crate::error::DmError;
use crate::message::{DmEvent, SealedPayload};

/// Stateless dual-recipient cipher for direct messages.
///
/// Every call re-derives keys from its inputs; instances hold only the
/// rotation setting and are cheap to copy and share across tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageCipher {
    rotation: KeyRotation,
}

impl MessageCipher {
    /// Cipher with rotation disabled: keys depend only on user ids.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cipher with the given rotation mode. With [`KeyRotation::Hourly`]
    /// an envelope stops being decryptable once the clock leaves the
    /// window it was sealed in.
    pub fn with_rotation(rotation: KeyRotation) -> Self {
        Self { rotation }
    }

    /// Seal `plaintext` so that both `sender_id` and `recipient_id` can
    /// recover it.
    pub fn encrypt(
        &self,
        plaintext: &str,
        sender_id: &str,
        recipient_id: &str,
    ) -> Result<SealedEnvelope, DmError> {
        let now = Utc::now();
        let payload = SealedPayload {
            content: plaintext.to_owned(),
            timestamp: now,
        };
        let canonical = serde_json::to_vec(&payload)?;

        let window = self.rotation.window_at(now);
        let sender_key = derive_key(sender_id, window);
        let recipient_key = derive_key(recipient_id, window);
        let aad = envelope_aad(sender_id, recipient_id);

        let sender_encrypted = URL_SAFE_NO_PAD.encode(
            seal::seal(&sender_key, &canonical, &aad).map_err(|_| DmError::EncryptionFailure)?,
        );
        let recipient_encrypted = URL_SAFE_NO_PAD.encode(
            seal::seal(&recipient_key, &canonical, &aad)
                .map_err(|_| DmError::EncryptionFailure)?,
        );
        let signature = mac::sign(&sender_key, &canonical);

        Ok(SealedEnvelope {
            sender_encrypted,
            recipient_encrypted,
            signature,
            timestamp: now,
            sender_id: sender_id.to_owned(),
            recipient_id: recipient_id.to_owned(),
        })
    }

    /// Open `envelope` as `requesting_user_id` and return the plaintext.
    ///
    /// The key is derived from the requester's own identifier; the
    /// ciphertext field is chosen by comparing that identifier against
    /// `envelope.sender_id`. A requester who is neither party ends up
    /// selecting the recipient ciphertext with a key that cannot open
    /// it, and fails.
    pub fn decrypt(
        &self,
        envelope: &SealedEnvelope,
        requesting_user_id: &str,
    ) -> Result<String, DmError> {
        let window = self.rotation.window_at(Utc::now());
        let key = derive_key(requesting_user_id, window);

        let ciphertext_b64 = if requesting_user_id == envelope.sender_id {
            &envelope.sender_encrypted
        } else {
            &envelope.recipient_encrypted
        };
        let ciphertext = URL_SAFE_NO_PAD
            .decode(ciphertext_b64)
            .map_err(|e| DmError::MalformedEnvelope(format!("bad base64 ciphertext: {e}")))?;

        let aad = envelope_aad(&envelope.sender_id, &envelope.recipient_id);
        let canonical =
            seal::open(&key, &ciphertext, &aad).map_err(|_| DmError::DecryptionFailure)?;

        // The tag is always keyed with the sender key, whichever side is
        // opening the envelope.
        let sender_key = derive_key(&envelope.sender_id, window);
        mac::verify(&sender_key, &canonical, &envelope.signature)
            .map_err(|_| DmError::IntegrityMismatch)?;

        let payload: SealedPayload =
            serde_json::from_slice(&canonical).map_err(|_| DmError::DecryptionFailure)?;
        Ok(payload.content)
    }

    /// Seal a typed DM event (reaction, GIF share) through the same path.
    pub fn encrypt_event(
        &self,
        event: &DmEvent,
        sender_id: &str,
        recipient_id: &str,
    ) -> Result<SealedEnvelope, DmError> {
        let json = serde_json::to_string(event)?;
        self.encrypt(&json, sender_id, recipient_id)
    }

    /// Open an envelope and parse the plaintext as a typed DM event.
    pub fn decrypt_event(
        &self,
        envelope: &SealedEnvelope,
        requesting_user_id: &str,
    ) -> Result<DmEvent, DmError> {
        let plaintext = self.decrypt(envelope, requesting_user_id)?;
        Ok(serde_json::from_str(&plaintext)?)
    }
}

/// Binds both cleartext identities into the AEAD associated data, so a
/// relabelled envelope fails authentication.
fn envelope_aad(sender_id: &str, recipient_id: &str) -> Vec<u8> {
    let mut aad = Vec::with_capacity(sender_id.len() + recipient_id.len() + 1);
    aad.extend_from_slice(sender_id.as_bytes());
    aad.push(0);
    aad.extend_from_slice(recipient_id.as_bytes());
    aad
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::message::ReactionAction;

    use super::*;

    #[test]
    fn recipient_can_decrypt() {
        let cipher = MessageCipher::new();
        let env = cipher.encrypt("hello world", "user-1", "user-2").unwrap();
        assert_eq!(cipher.decrypt(&env, "user-2").unwrap(), "hello world");
    }

    #[test]
    fn sender_can_decrypt() {
        let cipher = MessageCipher::new();
        let env = cipher.encrypt("hello world", "user-1", "user-2").unwrap();
        assert_eq!(cipher.decrypt(&env, "user-1").unwrap(), "hello world");
    }

    #[test]
    fn third_party_cannot_decrypt() {
        let cipher = MessageCipher::new();
        let env = cipher.encrypt("hello world", "user-1", "user-2").unwrap();
        let err = cipher.decrypt(&env, "user-3").unwrap_err();
        assert!(matches!(err, DmError::DecryptionFailure));
    }

    #[test]
    fn concrete_scenario() {
        let cipher = MessageCipher::new();
        let env = cipher.encrypt("hello world", "user-1", "user-2").unwrap();
        assert_eq!(env.sender_id, "user-1");
        assert_eq!(env.recipient_id, "user-2");
        assert_eq!(cipher.decrypt(&env, "user-2").unwrap(), "hello world");
        assert_eq!(cipher.decrypt(&env, "user-1").unwrap(), "hello world");
        assert!(cipher.decrypt(&env, "user-3").is_err());
    }

    #[test]
    fn ciphertexts_are_randomised_but_both_decryptable() {
        let cipher = MessageCipher::new();
        let a = cipher.encrypt("same message", "user-1", "user-2").unwrap();
        let b = cipher.encrypt("same message", "user-1", "user-2").unwrap();
        // Random nonces make byte-equality vanishingly unlikely; what
        // matters is that both open.
        assert_ne!(a.sender_encrypted, b.sender_encrypted);
        assert_ne!(a.recipient_encrypted, b.recipient_encrypted);
        assert_eq!(cipher.decrypt(&a, "user-2").unwrap(), "same message");
        assert_eq!(cipher.decrypt(&b, "user-2").unwrap(), "same message");
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let cipher = MessageCipher::new();
        let mut env = cipher.encrypt("original", "user-1", "user-2").unwrap();
        let mut chars: Vec<char> = env.recipient_encrypted.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        env.recipient_encrypted = chars.into_iter().collect();
        assert!(cipher.decrypt(&env, "user-2").is_err());
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let cipher = MessageCipher::new();
        let mut env = cipher.encrypt("original", "user-1", "user-2").unwrap();
        let mut tag = env.signature.into_bytes();
        tag[0] = if tag[0] == b'0' { b'1' } else { b'0' };
        env.signature = String::from_utf8(tag).unwrap();
        let err = cipher.decrypt(&env, "user-2").unwrap_err();
        assert!(matches!(err, DmError::IntegrityMismatch));
    }

    #[test]
    fn swapped_identities_fail_authentication() {
        let cipher = MessageCipher::new();
        let mut env = cipher.encrypt("original", "user-1", "user-2").unwrap();
        std::mem::swap(&mut env.sender_id, &mut env.recipient_id);
        assert!(cipher.decrypt(&env, "user-2").is_err());
    }

    #[test]
    fn reaction_event_roundtrip_is_identical_json() {
        let cipher = MessageCipher::new();
        let wire = json!({
            "type": "reaction",
            "message_id": "42",
            "emoji": "👍",
            "action": "add",
            "user_id": "user-1",
        });
        let event: DmEvent = serde_json::from_value(wire.clone()).unwrap();
        let env = cipher.encrypt_event(&event, "user-1", "user-2").unwrap();
        let out = cipher.decrypt_event(&env, "user-2").unwrap();
        assert_eq!(out, event);
        assert_eq!(serde_json::to_value(&out).unwrap(), wire);
    }

    #[test]
    fn gif_event_roundtrip() {
        let cipher = MessageCipher::new();
        let event = DmEvent::Gif {
            content: "https://media.example/cat.gif".into(),
            alt: "waving cat".into(),
        };
        let env = cipher.encrypt_event(&event, "user-1", "user-2").unwrap();
        assert_eq!(cipher.decrypt_event(&env, "user-2").unwrap(), event);
    }

    #[test]
    fn reaction_remove_action_survives() {
        let cipher = MessageCipher::new();
        let event = DmEvent::Reaction {
            message_id: "42".into(),
            emoji: "👍".into(),
            action: ReactionAction::Remove,
            user_id: "user-2".into(),
            timestamp: None,
        };
        let env = cipher.encrypt_event(&event, "user-2", "user-1").unwrap();
        assert_eq!(cipher.decrypt_event(&env, "user-1").unwrap(), event);
    }

    #[test]
    fn hourly_rotation_roundtrip_within_window() {
        let cipher = MessageCipher::with_rotation(KeyRotation::Hourly);
        let env = cipher.encrypt("rotating", "user-1", "user-2").unwrap();
        assert_eq!(cipher.decrypt(&env, "user-2").unwrap(), "rotating");
    }

    #[test]
    fn stale_rotation_window_fails() {
        // Build an envelope by hand as if it had been sealed one window
        // ago; the rotating cipher derives current-window keys and must
        // refuse it.
        let cipher = MessageCipher::with_rotation(KeyRotation::Hourly);
        let now = Utc::now();
        let current = KeyRotation::Hourly.window_at(now).unwrap();
        let stale = Some(current - 1);

        let payload = SealedPayload {
            content: "old".into(),
            timestamp: now,
        };
        let canonical = serde_json::to_vec(&payload).unwrap();
        let sender_key = derive_key("user-1", stale);
        let recipient_key = derive_key("user-2", stale);
        let aad = envelope_aad("user-1", "user-2");
        let env = SealedEnvelope {
            sender_encrypted: URL_SAFE_NO_PAD
                .encode(seal::seal(&sender_key, &canonical, &aad).unwrap()),
            recipient_encrypted: URL_SAFE_NO_PAD
                .encode(seal::seal(&recipient_key, &canonical, &aad).unwrap()),
            signature: mac::sign(&sender_key, &canonical),
            timestamp: now,
            sender_id: "user-1".into(),
            recipient_id: "user-2".into(),
        };

        let err = cipher.decrypt(&env, "user-2").unwrap_err();
        assert!(matches!(err, DmError::DecryptionFailure));
    }

    #[test]
    fn garbage_base64_is_malformed() {
        let cipher = MessageCipher::new();
        let mut env = cipher.encrypt("original", "user-1", "user-2").unwrap();
        env.recipient_encrypted = "!!not base64!!".into();
        let err = cipher.decrypt(&env, "user-2").unwrap_err();
        assert!(matches!(err, DmError::MalformedEnvelope(_)));
    }
}
