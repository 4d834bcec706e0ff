//! Length-prefixed binary encoding for values crossing the store boundary.
//!
//! Frame layout: `u32` big-endian payload length, then the JSON payload.
//! Decimals travel as strings, so `decode(encode(x)) == x` holds for every
//! order, result and counter.

use serde::{Serialize, de::DeserializeOwned};

use crate::constants::{LENGTH_PREFIX_BYTES, MAX_FRAME_LEN};
use crate::{ClearbookError, Result};

/// Encode `value` into a length-prefixed frame.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let payload = serde_json::to_vec(value)?;
    if payload.len() > MAX_FRAME_LEN {
        return Err(ClearbookError::Serialization(format!(
            "payload of {} bytes exceeds frame limit {MAX_FRAME_LEN}",
            payload.len()
        )));
    }
    let len = u32::try_from(payload.len())
        .map_err(|_| ClearbookError::Serialization("payload length overflows u32".into()))?;

    let mut frame = Vec::with_capacity(LENGTH_PREFIX_BYTES + payload.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Decode a frame produced by [`encode`].
///
/// The prefix must describe the remaining bytes exactly; truncated or
/// trailing data is rejected.
pub fn decode<T: DeserializeOwned>(frame: &[u8]) -> Result<T> {
    let (prefix, payload) = frame
        .split_at_checked(LENGTH_PREFIX_BYTES)
        .ok_or_else(|| ClearbookError::Serialization("frame shorter than length prefix".into()))?;

    let mut raw = [0u8; LENGTH_PREFIX_BYTES];
    raw.copy_from_slice(prefix);
    let declared = u32::from_be_bytes(raw) as usize;

    if declared > MAX_FRAME_LEN {
        return Err(ClearbookError::Serialization(format!(
            "declared length {declared} exceeds frame limit {MAX_FRAME_LEN}"
        )));
    }
    if declared != payload.len() {
        return Err(ClearbookError::Serialization(format!(
            "declared length {declared} does not match payload length {}",
            payload.len()
        )));
    }

    Ok(serde_json::from_slice(payload)?)
}
