//! Client configuration.
//!
//! Defaults suit the hosted gateway; everything can be overridden in
//! code, and the URL additionally via the `PV_GATEWAY_URL` environment
//! variable.

use std::time::Duration;

use pv_crypto::KeyRotation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// WebSocket gateway endpoint.
    pub gateway_url: String,

    /// Key rotation mode for the DM cipher.
    #[serde(default)]
    pub rotation: KeyRotation,

    /// Reconnect backoff schedule.
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            gateway_url: "wss://gateway.palaver.chat/ws".to_string(),
            rotation: KeyRotation::default(),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Default configuration with environment overrides applied.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(url) = std::env::var("PV_GATEWAY_URL") {
            cfg.gateway_url = url;
        }
        cfg
    }
}

/// Exponential backoff between reconnect attempts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReconnectPolicy {
    /// Delay before the first retry.
    pub initial_delay_ms: u64,
    /// Upper bound on any single delay.
    pub max_delay_ms: u64,
    /// Give up after this many consecutive failed dials.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            max_attempts: 10,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before reconnect attempt `attempt` (zero-based): doubles
    /// from the initial delay, capped at the maximum.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let doublings = attempt.min(31);
        let ms = self
            .initial_delay_ms
            .saturating_mul(1u64 << doublings)
            .min(self.max_delay_ms);
        Duration::from_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = ReconnectPolicy {
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            max_attempts: 10,
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(500));
        assert_eq!(policy.delay_for(1), Duration::from_millis(1_000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2_000));
        assert_eq!(policy.delay_for(6), Duration::from_millis(30_000));
        assert_eq!(policy.delay_for(60), Duration::from_millis(30_000));
    }

    #[test]
    fn config_defaults_have_rotation_disabled() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.rotation, KeyRotation::Disabled);
    }
}
