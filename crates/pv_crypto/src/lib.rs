//! pv_crypto: cryptographic primitives for Palaver sealed DMs
//!
//! # Design principles
//! - No custom crypto; all primitives come from audited RustCrypto crates.
//! - Secret key material is zeroized on drop.
//! - Everything here is pure and synchronous: no I/O, no shared state,
//!   safe to call from any number of concurrent tasks.
//!
//! # Module layout
//! - `derive` - per-user message keys (SHA-256, optional hourly rotation)
//! - `seal`   - AES-256-GCM seal/open helpers
//! - `mac`    - HMAC-SHA256 payload tags
//! - `error`  - unified error type

pub mod derive;
pub mod error;
pub mod mac;
pub mod seal;

pub use derive::{derive_key, KeyRotation, MessageKey, ROTATION_INTERVAL_MS};
pub use error::CryptoError;
