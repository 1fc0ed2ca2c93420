//! Failure taxonomy for sealing and opening direct messages.

use thiserror::Error;

/// Errors surfaced to callers of the cipher and frame codec.
///
/// Every variant is local and recoverable: the calling UI substitutes a
/// placeholder for the message body rather than crashing, and nothing
/// here is worth retrying.
#[derive(Debug, Error)]
pub enum DmError {
    /// Input was not a valid envelope: missing `dm:` prefix, invalid
    /// JSON, missing fields, or undecodable base64.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// AEAD sealing failed while encrypting.
    #[error("encryption failed")]
    EncryptionFailure,

    /// Wrong key, corrupted ciphertext, a rotation-window mismatch, or a
    /// payload that did not decode after opening.
    #[error("message could not be decrypted")]
    DecryptionFailure,

    /// The recomputed payload tag does not match the envelope signature.
    #[error("payload tag does not match envelope signature")]
    IntegrityMismatch,

    /// Payload serialisation failed.
    #[error("serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}
