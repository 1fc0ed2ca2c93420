//! Transport seam between the connection manager and the real network.
//!
//! The manager is generic over [`Transport`] so reconnect logic can be
//! exercised against an in-memory implementation; the WebSocket
//! implementation lives behind the `websocket` feature.

use async_trait::async_trait;

use crate::error::ClientError;

/// Dials a gateway endpoint and yields a bidirectional text stream.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn connect(&self, url: &str) -> Result<Box<dyn TransportStream>, ClientError>;
}

/// One established connection carrying text frames.
#[async_trait]
pub trait TransportStream: Send {
    /// Send one text frame.
    async fn send(&mut self, frame: String) -> Result<(), ClientError>;

    /// Receive the next text frame; `None` once the peer has closed.
    async fn recv(&mut self) -> Option<String>;

    /// Close the connection.
    async fn close(&mut self);
}

#[cfg(feature = "websocket")]
pub use websocket::WebSocketTransport;

#[cfg(feature = "websocket")]
mod websocket {
    use async_trait::async_trait;
    use futures_util::{SinkExt, StreamExt};
    use tokio::net::TcpStream;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

    use super::{Transport, TransportStream};
    use crate::error::ClientError;

    /// [`Transport`] over tokio-tungstenite.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct WebSocketTransport;

    struct WsStream {
        inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
    }

    #[async_trait]
    impl Transport for WebSocketTransport {
        async fn connect(&self, url: &str) -> Result<Box<dyn TransportStream>, ClientError> {
            let (stream, _response) = connect_async(url)
                .await
                .map_err(|e| ClientError::Transport(e.to_string()))?;
            Ok(Box::new(WsStream { inner: stream }))
        }
    }

    #[async_trait]
    impl TransportStream for WsStream {
        async fn send(&mut self, frame: String) -> Result<(), ClientError> {
            self.inner
                .send(Message::Text(frame))
                .await
                .map_err(|e| ClientError::Transport(e.to_string()))
        }

        async fn recv(&mut self) -> Option<String> {
            while let Some(msg) = self.inner.next().await {
                match msg {
                    Ok(Message::Text(text)) => return Some(text),
                    Ok(Message::Close(_)) | Err(_) => return None,
                    // Pings are answered during the next flush; binary
                    // and pong frames are not part of the protocol.
                    Ok(_) => continue,
                }
            }
            None
        }

        async fn close(&mut self) {
            let _ = self.inner.close(None).await;
        }
    }
}
