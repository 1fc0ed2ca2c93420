//! Wire framing for direct-message traffic.
//!
//! The gateway multiplexes several kinds of text frames on one socket.
//! Frames carrying a sealed envelope are tagged with a literal `dm:`
//! prefix; everything after the prefix is the envelope JSON.

use crate::envelope::SealedEnvelope;
use crate::error::DmError;

/// Literal tag prepended to envelope JSON on the wire.
pub const DM_PREFIX: &str = "dm:";

/// Whether `frame` carries a sealed envelope.
pub fn is_dm_frame(frame: &str) -> bool {
    frame.starts_with(DM_PREFIX)
}

/// Encode an envelope as a `dm:`-tagged text frame.
pub fn encode_frame(envelope: &SealedEnvelope) -> Result<String, DmError> {
    let json = serde_json::to_string(envelope)?;
    Ok(format!("{DM_PREFIX}{json}"))
}

/// Parse a `dm:`-tagged text frame back into an envelope.
pub fn decode_frame(frame: &str) -> Result<SealedEnvelope, DmError> {
    let json = frame
        .strip_prefix(DM_PREFIX)
        .ok_or_else(|| DmError::MalformedEnvelope("missing dm: prefix".into()))?;
    serde_json::from_str(json).map_err(|e| DmError::MalformedEnvelope(e.to_string()))
}
