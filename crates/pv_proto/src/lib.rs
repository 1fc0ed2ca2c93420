//! pv_proto: wire types and the sealed-message cipher for Palaver DMs.
//!
//! Everything that crosses the gateway is JSON text. A direct message is
//! a [`SealedEnvelope`] produced by [`MessageCipher`]; the frame codec
//! tags envelope JSON with a literal `dm:` prefix before it goes on the
//! wire.
//!
//! # Modules
//! - `envelope` - the on-wire envelope (what the backend relays)
//! - `message`  - canonical payload and typed DM events
//! - `cipher`   - dual-recipient encrypt/decrypt
//! - `codec`    - `dm:` frame tagging
//! - `error`    - failure taxonomy

pub mod cipher;
pub mod codec;
pub mod envelope;
pub mod error;
pub mod message;

pub use cipher::MessageCipher;
pub use envelope::SealedEnvelope;
pub use error::DmError;
pub use message::{DmEvent, ReactionAction, SealedPayload};
