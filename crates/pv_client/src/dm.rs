//! Direct-message service: seals outgoing traffic, opens incoming
//! frames, on behalf of one local user.

use chrono::Utc;

use pv_crypto::KeyRotation;
use pv_proto::{codec, DmError, DmEvent, MessageCipher, ReactionAction};

/// Body shown in place of a message that failed to open.
pub const UNDECRYPTABLE_PLACEHOLDER: &str = "message could not be decrypted";

/// Classified result of opening one incoming frame.
#[derive(Debug)]
pub enum DmIncoming {
    /// A plain text message.
    Message { sender_id: String, body: String },
    /// A typed event (reaction, GIF share).
    Event { sender_id: String, event: DmEvent },
    /// The frame was DM traffic but could not be opened; render
    /// [`UNDECRYPTABLE_PLACEHOLDER`] in place of the body.
    Undecryptable {
        sender_id: Option<String>,
        reason: DmError,
    },
}

/// Seals and opens DM frames for one local user.
#[derive(Debug, Clone)]
pub struct DmService {
    cipher: MessageCipher,
    local_user_id: String,
}

impl DmService {
    pub fn new(local_user_id: impl Into<String>, rotation: KeyRotation) -> Self {
        Self {
            cipher: MessageCipher::with_rotation(rotation),
            local_user_id: local_user_id.into(),
        }
    }

    pub fn local_user_id(&self) -> &str {
        &self.local_user_id
    }

    /// Seal a text message for `recipient_id` into a ready wire frame.
    pub fn seal_text(&self, recipient_id: &str, body: &str) -> Result<String, DmError> {
        let envelope = self.cipher.encrypt(body, &self.local_user_id, recipient_id)?;
        codec::encode_frame(&envelope)
    }

    /// Seal a reaction event.
    pub fn seal_reaction(
        &self,
        recipient_id: &str,
        message_id: &str,
        emoji: &str,
        action: ReactionAction,
    ) -> Result<String, DmError> {
        let event = DmEvent::Reaction {
            message_id: message_id.to_owned(),
            emoji: emoji.to_owned(),
            action,
            user_id: self.local_user_id.clone(),
            timestamp: Some(Utc::now()),
        };
        let envelope = self
            .cipher
            .encrypt_event(&event, &self.local_user_id, recipient_id)?;
        codec::encode_frame(&envelope)
    }

    /// Seal a GIF share.
    pub fn seal_gif(&self, recipient_id: &str, url: &str, alt: &str) -> Result<String, DmError> {
        let event = DmEvent::Gif {
            content: url.to_owned(),
            alt: alt.to_owned(),
        };
        let envelope = self
            .cipher
            .encrypt_event(&event, &self.local_user_id, recipient_id)?;
        codec::encode_frame(&envelope)
    }

    /// Open one incoming wire frame.
    ///
    /// Returns `None` for frames that are not DM traffic at all.
    /// Decrypted text that parses as a tagged [`DmEvent`] is surfaced as
    /// an event; anything else is a plain message.
    pub fn open_frame(&self, frame: &str) -> Option<DmIncoming> {
        if !codec::is_dm_frame(frame) {
            return None;
        }
        let envelope = match codec::decode_frame(frame) {
            Ok(envelope) => envelope,
            Err(reason) => {
                tracing::warn!(target: "pv_client", event = "dm_frame_malformed", error = %reason);
                return Some(DmIncoming::Undecryptable {
                    sender_id: None,
                    reason,
                });
            }
        };
        let sender_id = envelope.sender_id.clone();
        match self.cipher.decrypt(&envelope, &self.local_user_id) {
            Ok(plaintext) => match serde_json::from_str::<DmEvent>(&plaintext) {
                Ok(event) => Some(DmIncoming::Event { sender_id, event }),
                Err(_) => Some(DmIncoming::Message {
                    sender_id,
                    body: plaintext,
                }),
            },
            Err(reason) => {
                tracing::warn!(
                    target: "pv_client",
                    event = "dm_decrypt_failed",
                    sender_id = %sender_id,
                    error = %reason
                );
                Some(DmIncoming::Undecryptable {
                    sender_id: Some(sender_id),
                    reason,
                })
            }
        }
    }
}
