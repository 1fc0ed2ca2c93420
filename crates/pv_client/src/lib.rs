//! pv_client: gateway plumbing for Palaver sealed DMs.
//!
//! Two pieces, kept deliberately apart:
//! - [`ConnectionManager`] owns the socket lifecycle (dial, read loop,
//!   exponential-backoff redial) and moves opaque text frames.
//! - [`DmService`] seals outgoing messages and opens incoming `dm:`
//!   frames on behalf of one local user.
//!
//! The split keeps cryptographic concerns out of reconnect logic; the
//! manager never looks inside a frame, and the service never touches a
//! socket.

pub mod config;
pub mod connection;
pub mod dm;
pub mod error;
pub mod transport;

pub use config::{ClientConfig, ReconnectPolicy};
pub use connection::ConnectionManager;
pub use dm::{DmIncoming, DmService, UNDECRYPTABLE_PLACEHOLDER};
pub use error::ClientError;
#[cfg(feature = "websocket")]
pub use transport::WebSocketTransport;
pub use transport::{Transport, TransportStream};
