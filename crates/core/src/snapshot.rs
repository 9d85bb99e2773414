//! Session snapshot capture and restore.
//!
//! Snapshots carry session bookkeeping only. Restoring one repopulates the
//! in-memory identity fields and never reaches into the external tool;
//! callers needing real device state rolled back must issue explicit
//! lifecycle mutations themselves.

use std::time::{SystemTime, UNIX_EPOCH};

use simbridge_protocol::{SNAPSHOT_VERSION, SnapshotPayload};

use crate::error::{Error, Result};
use crate::session::DeviceSession;

/// Captures the session's bookkeeping fields.
///
/// Succeeds for any session that has been resolved; the session itself is
/// never mutated.
pub fn capture(session: &DeviceSession) -> Result<SnapshotPayload> {
    let device_id = session.require_device()?;
    Ok(SnapshotPayload::new(
        device_id,
        session.bundle_id(),
        unix_timestamp(),
    ))
}

/// Repopulates session identity from a decoded payload.
///
/// Validation happens before any field is written, so a rejected payload
/// leaves the session exactly as it was. The restored session lands on
/// `Resolved`.
pub fn restore(session: &mut DeviceSession, payload: &SnapshotPayload) -> Result<()> {
    if payload.version != SNAPSHOT_VERSION {
        return Err(Error::SnapshotCorrupt(format!(
            "unsupported version {}",
            payload.version
        )));
    }
    if payload.device_id.is_empty() {
        return Err(Error::SnapshotCorrupt("empty device id".to_string()));
    }
    session.adopt(payload.device_id.clone(), payload.bundle_id.clone());
    Ok(())
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}
