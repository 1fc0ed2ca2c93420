//! Plaintext records carried inside the envelope ciphertexts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical plaintext record: what actually gets sealed.
///
/// Serialised as `{"content": ..., "timestamp": ...}`. The same bytes
/// feed both ciphertexts and the payload tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SealedPayload {
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Typed DM events that ride through the cipher as JSON text.
///
/// Reactions and GIF shares reuse the message path: the record is
/// JSON-encoded, sealed like any text message, and recognised on the
/// receiving side by its `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DmEvent {
    Reaction {
        /// Id of the message being reacted to.
        message_id: String,
        emoji: String,
        action: ReactionAction,
        /// Who reacted.
        user_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<DateTime<Utc>>,
    },
    Gif {
        /// GIF URL.
        content: String,
        alt: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionAction {
    Add,
    Remove,
}
