//! Gateway connection lifecycle.
//!
//! The connection manager owns one logical connection to the chat
//! gateway: callers dial once, push outgoing text frames, and read
//! incoming frames from a channel. When the link drops, the manager
//! redials on an exponential backoff schedule, keeping a
//! consecutive-failure counter that resets once a dial succeeds. Frames
//! are opaque text here; nothing cryptographic leaks into this module.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::ReconnectPolicy;
use crate::error::ClientError;
use crate::transport::{Transport, TransportStream};

const CHANNEL_CAPACITY: usize = 64;

/// Owns the lifecycle of one gateway connection.
pub struct ConnectionManager<T: Transport> {
    transport: Arc<T>,
    url: String,
    policy: ReconnectPolicy,
    running: Option<Running>,
}

struct Running {
    outbound: mpsc::Sender<String>,
    shutdown: watch::Sender<bool>,
    driver: JoinHandle<()>,
}

impl<T: Transport> ConnectionManager<T> {
    pub fn new(transport: T, url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self {
            transport: Arc::new(transport),
            url: url.into(),
            policy,
            running: None,
        }
    }

    /// Dial the gateway and start the driver task.
    ///
    /// Returns the channel incoming text frames are delivered on. The
    /// first dial happens before this returns, so a bad endpoint fails
    /// here instead of silently in the background; only later drops go
    /// through the backoff schedule.
    pub async fn connect(&mut self) -> Result<mpsc::Receiver<String>, ClientError> {
        if self.running.is_some() {
            return Err(ClientError::Transport("already connected".into()));
        }
        let stream = self.transport.connect(&self.url).await?;
        tracing::info!(target: "pv_client", event = "connected", url = %self.url);

        let (inbound_tx, inbound_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (outbound_tx, outbound_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let driver = tokio::spawn(drive(
            Arc::clone(&self.transport),
            self.url.clone(),
            self.policy,
            stream,
            inbound_tx,
            outbound_rx,
            shutdown_rx,
        ));

        self.running = Some(Running {
            outbound: outbound_tx,
            shutdown: shutdown_tx,
            driver,
        });
        Ok(inbound_rx)
    }

    /// Queue a text frame for sending.
    pub async fn send(&self, frame: String) -> Result<(), ClientError> {
        let running = self.running.as_ref().ok_or(ClientError::NotConnected)?;
        running
            .outbound
            .send(frame)
            .await
            .map_err(|_| ClientError::NotConnected)
    }

    /// Close the connection and stop reconnecting.
    pub async fn disconnect(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.shutdown.send(true);
            let _ = running.driver.await;
            tracing::info!(target: "pv_client", event = "disconnected", url = %self.url);
        }
    }

    /// Whether a driver task is active (connected or redialing).
    pub fn is_running(&self) -> bool {
        self.running.as_ref().is_some_and(|r| !r.driver.is_finished())
    }
}

/// Pumps one stream until it drops, then redials with backoff. Exits on
/// shutdown, when the caller goes away, or when attempts are exhausted.
async fn drive<T: Transport>(
    transport: Arc<T>,
    url: String,
    policy: ReconnectPolicy,
    mut stream: Box<dyn TransportStream>,
    inbound: mpsc::Sender<String>,
    mut outbound: mpsc::Receiver<String>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut attempts: u32 = 0;
    loop {
        // Pump the live stream.
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    stream.close().await;
                    return;
                }
                frame = outbound.recv() => match frame {
                    Some(frame) => {
                        if let Err(error) = stream.send(frame).await {
                            tracing::warn!(target: "pv_client", event = "send_failed", error = %error);
                            break;
                        }
                    }
                    // The manager itself is gone.
                    None => {
                        stream.close().await;
                        return;
                    }
                },
                incoming = stream.recv() => match incoming {
                    Some(text) => {
                        if inbound.send(text).await.is_err() {
                            // Nobody is listening any more.
                            stream.close().await;
                            return;
                        }
                    }
                    None => {
                        tracing::info!(target: "pv_client", event = "connection_lost", url = %url);
                        break;
                    }
                },
            }
        }

        // Redial with exponential backoff.
        loop {
            if attempts >= policy.max_attempts {
                tracing::error!(
                    target: "pv_client",
                    event = "reconnect_exhausted",
                    attempts = attempts
                );
                return;
            }
            let delay = policy.delay_for(attempts);
            attempts += 1;
            tracing::info!(
                target: "pv_client",
                event = "reconnect_wait",
                attempt = attempts,
                delay_ms = delay.as_millis() as u64
            );
            tokio::select! {
                _ = shutdown.changed() => return,
                () = tokio::time::sleep(delay) => {}
            }
            match transport.connect(&url).await {
                Ok(next) => {
                    tracing::info!(target: "pv_client", event = "reconnected", attempt = attempts);
                    stream = next;
                    attempts = 0;
                    break;
                }
                Err(error) => {
                    tracing::warn!(
                        target: "pv_client",
                        event = "reconnect_failed",
                        attempt = attempts,
                        error = %error
                    );
                }
            }
        }
    }
}

#[cfg(feature = "websocket")]
impl ConnectionManager<crate::transport::WebSocketTransport> {
    /// Manager for the configured gateway over WebSocket.
    pub fn from_config(config: &crate::config::ClientConfig) -> Self {
        Self::new(
            crate::transport::WebSocketTransport,
            config.gateway_url.clone(),
            config.reconnect,
        )
    }
}
