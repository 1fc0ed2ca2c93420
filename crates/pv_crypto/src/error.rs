use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("AEAD encryption failed")]
    Seal,

    #[error("AEAD decryption failed (authentication tag mismatch or truncated input)")]
    Open,

    #[error("payload tag does not match")]
    MacMismatch,
}
