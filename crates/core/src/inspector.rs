//! Read-only state queries against the external tool.

use simbridge_protocol::{DeviceState, SessionStateReport, TreeReport};
use tracing::debug;

use crate::client::{ControlCommand, DeviceControlClient};
use crate::error::{Error, Result};
use crate::session::DeviceSession;

/// Issues the read-only accessibility dump and returns the fixed tree
/// shape for the session's bundle.
///
/// The dump output is not parsed into a real tree; the placeholder below
/// is the documented contract, and the invocation's exit status is
/// ignored like its output.
pub fn query_ui(
    session: &DeviceSession,
    client: &impl DeviceControlClient,
) -> Result<TreeReport> {
    let device_id = session.require_device()?.to_string();
    client.run(&ControlCommand::DumpAccessibility { device_id })?;
    Ok(TreeReport::placeholder(session.bundle_id()))
}

/// Queries the device listing and classifies the session device's status.
pub fn current_state(
    session: &DeviceSession,
    client: &impl DeviceControlClient,
) -> Result<SessionStateReport> {
    let device_id = session.require_device()?.to_string();
    let output = client.run(&ControlCommand::ListDevices)?;
    if !output.success {
        return Err(Error::ExecutionFailed("device listing failed".to_string()));
    }

    let state = classify_status(&output.stdout, &device_id);
    debug!(target = "simbridge", device_id = %device_id, state = %state, "device state");
    Ok(SessionStateReport {
        device_id,
        state,
        bundle_id: session.bundle_id().to_string(),
    })
}

/// Classifies the free-text listing line for one device.
///
/// An unrecognized or missing status is a valid outcome, not an error:
/// the listing itself succeeded.
fn classify_status(listing: &str, device_id: &str) -> DeviceState {
    let Some(line) = listing.lines().find(|line| line.contains(device_id)) else {
        return DeviceState::Unknown;
    };
    if line.contains("Booted") {
        DeviceState::Booted
    } else if line.contains("Shutdown") {
        DeviceState::Shutdown
    } else {
        DeviceState::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session;
    use crate::testing::{RecordingClient, TEST_DEVICE_ID};

    fn resolved_session(client: &RecordingClient) -> DeviceSession {
        let mut session = DeviceSession::new("com.example.app");
        session::resolve(&mut session, client).unwrap();
        session
    }

    #[test]
    fn classifies_booted_and_shutdown_lines() {
        let listing = "iPhone 15 (AAAA-1111) (Booted)\niPhone 14 (BBBB-2222) (Shutdown)\n";
        assert_eq!(classify_status(listing, "AAAA-1111"), DeviceState::Booted);
        assert_eq!(classify_status(listing, "BBBB-2222"), DeviceState::Shutdown);
    }

    #[test]
    fn unrecognized_status_is_unknown_not_an_error() {
        let listing = "iPhone 15 (AAAA-1111) (Creating)\n";
        assert_eq!(classify_status(listing, "AAAA-1111"), DeviceState::Unknown);
        assert_eq!(classify_status(listing, "CCCC-3333"), DeviceState::Unknown);
    }

    #[test]
    fn current_state_reports_session_identity() {
        let client = RecordingClient::new();
        let session = resolved_session(&client);

        let report = current_state(&session, &client).unwrap();
        assert_eq!(report.device_id, TEST_DEVICE_ID);
        assert_eq!(report.state, DeviceState::Booted);
        assert_eq!(report.bundle_id, "com.example.app");
    }

    #[test]
    fn current_state_with_scripted_listing() {
        let client = RecordingClient::new();
        let session = resolved_session(&client);
        client.set_device_listing(format!("Test Device ({TEST_DEVICE_ID}) (Shutdown)"));

        let report = current_state(&session, &client).unwrap();
        assert_eq!(report.state, DeviceState::Shutdown);
    }

    #[test]
    fn queries_require_a_resolved_session() {
        let client = RecordingClient::new();
        let session = DeviceSession::new("com.example.app");

        assert!(query_ui(&session, &client).is_err());
        assert!(current_state(&session, &client).is_err());
        assert_eq!(client.invocation_count(), 0);
    }

    #[test]
    fn query_ui_ignores_dump_exit_status() {
        let client = RecordingClient::new();
        let session = resolved_session(&client);
        client.fail_commands_containing("AccessibilityUtility");

        let tree = query_ui(&session, &client).unwrap();
        assert_eq!(tree.root.bundle_id, "com.example.app");
    }
}
