//! Versioned snapshot payload and raw-buffer framing.
//!
//! A snapshot captures session bookkeeping only (device id, bundle id,
//! capture time) - never real device state. When transported as a raw
//! buffer the JSON body is framed with a u32 little-endian length prefix;
//! callers treat the whole buffer as opaque and round-trip it unmodified.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

const LENGTH_PREFIX: usize = 4;

/// Errors produced while decoding a snapshot buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotDecodeError {
    #[error("buffer too short for length prefix")]
    MissingPrefix,

    #[error("length prefix says {declared} bytes, body has {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("body is not a valid snapshot: {0}")]
    Malformed(String),

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
}

/// Point-in-time capture of a session's bookkeeping fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotPayload {
    pub version: u32,
    pub device_id: String,
    pub bundle_id: String,
    /// Capture time, seconds since the UNIX epoch.
    pub timestamp: u64,
}

impl SnapshotPayload {
    pub fn new(
        device_id: impl Into<String>,
        bundle_id: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        SnapshotPayload {
            version: SNAPSHOT_VERSION,
            device_id: device_id.into(),
            bundle_id: bundle_id.into(),
            timestamp,
        }
    }

    /// Encodes the payload as a length-prefixed buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let body = serde_json::to_vec(self).expect("snapshot payload serializes to JSON");
        let mut buffer = Vec::with_capacity(LENGTH_PREFIX + body.len());
        buffer.extend_from_slice(&(body.len() as u32).to_le_bytes());
        buffer.extend_from_slice(&body);
        buffer
    }

    /// Decodes a length-prefixed buffer, validating framing and version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotDecodeError> {
        if bytes.len() < LENGTH_PREFIX {
            return Err(SnapshotDecodeError::MissingPrefix);
        }
        let (prefix, body) = bytes.split_at(LENGTH_PREFIX);
        let declared = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
        if declared != body.len() {
            return Err(SnapshotDecodeError::LengthMismatch {
                declared,
                actual: body.len(),
            });
        }
        let payload: SnapshotPayload = serde_json::from_slice(body)
            .map_err(|err| SnapshotDecodeError::Malformed(err.to_string()))?;
        if payload.version != SNAPSHOT_VERSION {
            return Err(SnapshotDecodeError::UnsupportedVersion(payload.version));
        }
        Ok(payload)
    }
}
