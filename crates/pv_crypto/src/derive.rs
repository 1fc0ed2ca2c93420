//! Per-user message key derivation.
//!
//! A user's key is SHA-256 over a fixed domain prefix, the user id, and a
//! fixed suffix. With rotation enabled, the base digest is re-hashed
//! together with the current hour window; both ends must then derive
//! within the same window or decryption fails, which is why rotation is
//! opt-in rather than the default.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::ZeroizeOnDrop;

/// Window length for rotating keys (1 hour).
pub const ROTATION_INTERVAL_MS: i64 = 3_600_000;

const KEY_PREFIX: &[u8] = b"pv-dm-key-v1\x00";
const KEY_SUFFIX: &[u8] = b"\x00pv-dm-key";

/// 32-byte symmetric message key derived from a user id. Zeroized on drop.
#[derive(ZeroizeOnDrop)]
pub struct MessageKey(pub [u8; 32]);

/// Whether derived keys rotate over time.
///
/// With [`KeyRotation::Hourly`], an envelope sealed in window N cannot be
/// opened once the clock enters window N+1: old messages become
/// permanently unreadable. Keys carry no window at all when disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyRotation {
    /// Keys depend only on the user id.
    #[default]
    Disabled,
    /// Keys additionally depend on `floor(unix_millis / ROTATION_INTERVAL_MS)`.
    Hourly,
}

impl KeyRotation {
    /// The rotation window containing `at`, or `None` when disabled.
    pub fn window_at(self, at: DateTime<Utc>) -> Option<u64> {
        match self {
            KeyRotation::Disabled => None,
            KeyRotation::Hourly => {
                Some((at.timestamp_millis() / ROTATION_INTERVAL_MS) as u64)
            }
        }
    }
}

/// Derive the message key for `user_id`, optionally bound to a rotation
/// window.
pub fn derive_key(user_id: &str, window: Option<u64>) -> MessageKey {
    let mut hasher = Sha256::new();
    hasher.update(KEY_PREFIX);
    hasher.update(user_id.as_bytes());
    hasher.update(KEY_SUFFIX);
    let base = hasher.finalize();

    let digest = match window {
        None => base,
        Some(w) => {
            let mut rehash = Sha256::new();
            rehash.update(base);
            rehash.update(w.to_be_bytes());
            rehash.finalize()
        }
    };

    MessageKey(digest.into())
}
