//! Device session identity and lifecycle.
//!
//! A session is constructed explicitly by the caller and passed into every
//! operation; nothing in the bridge lazily allocates one. Resolution binds
//! the session to the first booted device the external tool reports and is
//! attempted at most once until [`DeviceSession::reset`].

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::info;

use crate::client::{ControlCommand, DeviceControlClient};
use crate::error::{Error, Result};

/// Lifecycle state of the device/application pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Resolved,
    Active,
    ShutDown,
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lifecycle::Uninitialized => f.write_str("uninitialized"),
            Lifecycle::Resolved => f.write_str("resolved"),
            Lifecycle::Active => f.write_str("active"),
            Lifecycle::ShutDown => f.write_str("shut down"),
        }
    }
}

/// The bound device/application pair for one test run.
#[derive(Debug, Clone)]
pub struct DeviceSession {
    device_id: Option<String>,
    bundle_id: String,
    lifecycle: Lifecycle,
    resolution_attempted: bool,
}

impl DeviceSession {
    pub fn new(bundle_id: impl Into<String>) -> Self {
        DeviceSession {
            device_id: None,
            bundle_id: bundle_id.into(),
            lifecycle: Lifecycle::Uninitialized,
            resolution_attempted: false,
        }
    }

    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    pub fn bundle_id(&self) -> &str {
        &self.bundle_id
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Returns the device id, or the not-ready error when the session has
    /// not been resolved.
    pub(crate) fn require_device(&self) -> Result<&str> {
        match (&self.device_id, self.lifecycle) {
            (Some(id), lifecycle) if lifecycle != Lifecycle::Uninitialized => Ok(id),
            _ => Err(Error::SessionNotReady(self.lifecycle)),
        }
    }

    pub(crate) fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        self.lifecycle = lifecycle;
    }

    /// Repopulates identity fields from a snapshot. The session lands on
    /// [`Lifecycle::Resolved`]; real device state is untouched.
    pub(crate) fn adopt(&mut self, device_id: String, bundle_id: String) {
        self.device_id = Some(device_id);
        self.bundle_id = bundle_id;
        self.lifecycle = Lifecycle::Resolved;
        self.resolution_attempted = true;
    }

    /// Clears identity and re-arms resolution.
    pub fn reset(&mut self) {
        self.device_id = None;
        self.lifecycle = Lifecycle::Uninitialized;
        self.resolution_attempted = false;
    }
}

#[derive(Deserialize)]
struct DeviceList {
    devices: BTreeMap<String, Vec<DeviceEntry>>,
}

#[derive(Deserialize)]
struct DeviceEntry {
    udid: String,
    state: String,
}

/// Binds the session to the first booted device the tool reports.
///
/// Idempotent once resolved. A failed attempt is remembered: subsequent
/// calls re-report [`Error::NoDeviceAvailable`] without re-querying the
/// tool until the session is reset.
pub fn resolve(session: &mut DeviceSession, client: &impl DeviceControlClient) -> Result<()> {
    if session.device_id.is_some() {
        return Ok(());
    }
    if session.resolution_attempted {
        return Err(Error::NoDeviceAvailable);
    }
    session.resolution_attempted = true;

    let output = client.run(&ControlCommand::ListBootedDevices)?;
    if !output.success {
        return Err(Error::ExecutionFailed("device listing failed".to_string()));
    }

    let listing: DeviceList = serde_json::from_str(&output.stdout)?;
    let udid = listing
        .devices
        .into_values()
        .flatten()
        .find(|entry| entry.state == "Booted")
        .map(|entry| entry.udid)
        .ok_or(Error::NoDeviceAvailable)?;

    // A udid that could disturb command rendering never comes from the real
    // tool; reject it rather than embed it.
    if udid.is_empty() || !udid.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(Error::ExecutionFailed(format!(
            "implausible device id in listing: {udid}"
        )));
    }

    info!(target = "simbridge", device_id = %udid, "resolved booted device");
    session.device_id = Some(udid);
    // Only booted devices are considered, so resolution completes the
    // Resolved -> Active transition immediately.
    session.lifecycle = Lifecycle::Active;
    Ok(())
}

/// Issues one lifecycle mutation from the fixed entity/action set.
///
/// Unknown combinations are [`Error::UnsupportedOperation`]; the session
/// lifecycle advances only when the command exits zero.
pub fn mutate(
    session: &mut DeviceSession,
    client: &impl DeviceControlClient,
    entity: &str,
    action: &str,
) -> Result<()> {
    let device_id = session.require_device()?.to_string();

    let command = match (entity, action) {
        ("simulator", "boot") => ControlCommand::Boot { device_id },
        ("simulator", "shutdown") => ControlCommand::Shutdown { device_id },
        ("app", "launch") => ControlCommand::Launch {
            device_id,
            bundle_id: session.bundle_id.clone(),
        },
        ("app", "terminate") => ControlCommand::Terminate {
            device_id,
            bundle_id: session.bundle_id.clone(),
        },
        _ => {
            return Err(Error::UnsupportedOperation {
                entity: entity.to_string(),
                action: action.to_string(),
            });
        }
    };

    info!(target = "simbridge", entity, action, "mutate device state");
    let output = client.run(&command)?;
    if !output.success {
        return Err(Error::ExecutionFailed(format!(
            "{entity} {action} command failed"
        )));
    }

    match (entity, action) {
        ("simulator", "boot") => session.set_lifecycle(Lifecycle::Active),
        ("simulator", "shutdown") => session.set_lifecycle(Lifecycle::ShutDown),
        _ => {}
    }
    Ok(())
}
