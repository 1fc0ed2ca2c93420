//! Sealed direct-message envelope: the one structure that crosses the
//! wire.
//!
//! The backend relays envelopes verbatim and sees only:
//!   - sender_id / recipient_id (cleartext, so the receiving side can
//!     tell which ciphertext field applies to it)
//!   - two opaque ciphertexts
//!   - a payload tag and a creation timestamp
//!
//! Field names follow the gateway's JSON casing (camelCase).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// On-wire envelope for one direct message.
///
/// Exactly one of `sender_encrypted` / `recipient_encrypted` is
/// decryptable by a given participant, selected by comparing the
/// requesting user's id against `sender_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedEnvelope {
    /// AES-256-GCM output under the sender-derived key, base64.
    pub sender_encrypted: String,

    /// AES-256-GCM output under the recipient-derived key, base64.
    pub recipient_encrypted: String,

    /// Hex HMAC-SHA256 of the canonical payload bytes, keyed with the
    /// sender-derived key. Verified on every decrypt.
    pub signature: String,

    /// Envelope creation time. Not an input to key derivation.
    pub timestamp: DateTime<Utc>,

    pub sender_id: String,

    pub recipient_id: String,
}
