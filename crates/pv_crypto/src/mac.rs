//! Payload authentication tags.
//!
//! Envelopes carry an HMAC-SHA256 over the canonical payload bytes, keyed
//! with the sender-derived key. Keys derive from (public) user ids, so
//! anyone who knows the sender id can recompute the tag: it is tamper
//! evidence for the payload, not proof of authorship.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::derive::MessageKey;
use crate::error::CryptoError;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 of `payload` under `key`.
pub fn sign(key: &MessageKey, payload: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(&key.0).expect("HMAC accepts keys of any length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time check of a hex tag produced by [`sign`].
pub fn verify(key: &MessageKey, payload: &[u8], tag_hex: &str) -> Result<(), CryptoError> {
    let expected = hex::decode(tag_hex).map_err(|_| CryptoError::MacMismatch)?;
    let mut mac =
        HmacSha256::new_from_slice(&key.0).expect("HMAC accepts keys of any length");
    mac.update(payload);
    mac.verify_slice(&expected).map_err(|_| CryptoError::MacMismatch)
}

#[cfg(test)]
mod tests {
    use crate::derive::derive_key;

    use super::*;

    #[test]
    fn sign_verify_roundtrip() {
        let key = derive_key("user-1", None);
        let tag = sign(&key, b"payload bytes");
        assert!(verify(&key, b"payload bytes", &tag).is_ok());
    }

    #[test]
    fn altered_payload_is_rejected() {
        let key = derive_key("user-1", None);
        let tag = sign(&key, b"payload bytes");
        assert!(verify(&key, b"payload bytez", &tag).is_err());
    }

    #[test]
    fn wrong_key_is_rejected() {
        let key = derive_key("user-1", None);
        let other = derive_key("user-2", None);
        let tag = sign(&key, b"payload bytes");
        assert!(verify(&other, b"payload bytes", &tag).is_err());
    }

    #[test]
    fn non_hex_tag_is_rejected() {
        let key = derive_key("user-1", None);
        assert!(verify(&key, b"payload", "not hex!").is_err());
    }
}
