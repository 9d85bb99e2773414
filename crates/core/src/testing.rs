//! Testing infrastructure for the bridge.
//!
//! Provides [`RecordingClient`], a test double for the external tool:
//! responses are scripted, every invocation is recorded with its rendered
//! command line, and overlapping invocations are detected so the
//! one-invocation-per-session guarantee can be asserted.
//!
//! # Example
//!
//! ```ignore
//! use simbridge::DeviceBridge;
//! use simbridge::testing::RecordingClient;
//!
//! let client = RecordingClient::new();
//! let bridge = DeviceBridge::new("com.example.app", &client);
//! bridge.resolve().unwrap();
//! // ... drive the bridge, then assert on client.rendered()
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::client::{CommandOutput, ControlCommand, DeviceControlClient};
use crate::error::{Error, Result};

/// Device id reported by [`RecordingClient`]'s default listings.
pub const TEST_DEVICE_ID: &str = "TEST-DEVICE-0001";

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedInvocation {
    pub command: ControlCommand,
    pub rendered: String,
}

/// Recording test double for [`DeviceControlClient`].
///
/// By default every command succeeds and the listings report a single
/// booted device, [`TEST_DEVICE_ID`]. Configure failures and listings with
/// the `set_*`/`fail_*` methods, then assert on [`rendered`](Self::rendered)
/// or [`invocations`](Self::invocations).
pub struct RecordingClient {
    invocations: Mutex<Vec<RecordedInvocation>>,
    booted_listing: Mutex<String>,
    device_listing: Mutex<String>,
    fail_marker: Mutex<Option<String>>,
    fail_spawn: AtomicBool,
    in_flight: AtomicBool,
    overlap_detected: AtomicBool,
    dwell: Mutex<Option<Duration>>,
}

impl Default for RecordingClient {
    fn default() -> Self {
        RecordingClient::new()
    }
}

impl RecordingClient {
    pub fn new() -> Self {
        RecordingClient {
            invocations: Mutex::new(Vec::new()),
            booted_listing: Mutex::new(format!(
                r#"{{"devices":{{"test-runtime":[{{"udid":"{TEST_DEVICE_ID}","state":"Booted","name":"Test Device"}}]}}}}"#
            )),
            device_listing: Mutex::new(format!("Test Device ({TEST_DEVICE_ID}) (Booted)")),
            fail_marker: Mutex::new(None),
            fail_spawn: AtomicBool::new(false),
            in_flight: AtomicBool::new(false),
            overlap_detected: AtomicBool::new(false),
            dwell: Mutex::new(None),
        }
    }

    /// Replaces the JSON payload returned for the booted-device listing.
    pub fn set_booted_listing(&self, listing: impl Into<String>) {
        *self.booted_listing.lock() = listing.into();
    }

    /// Replaces the free-text payload returned for the device listing.
    pub fn set_device_listing(&self, listing: impl Into<String>) {
        *self.device_listing.lock() = listing.into();
    }

    /// Commands whose rendered line contains `marker` exit non-zero.
    pub fn fail_commands_containing(&self, marker: impl Into<String>) {
        *self.fail_marker.lock() = Some(marker.into());
    }

    /// Every subsequent invocation fails as if the process never spawned.
    pub fn fail_spawn(&self) {
        self.fail_spawn.store(true, Ordering::SeqCst);
    }

    /// Holds each invocation open for `duration`, widening race windows in
    /// concurrency tests.
    pub fn set_dwell(&self, duration: Duration) {
        *self.dwell.lock() = Some(duration);
    }

    /// All invocations recorded so far.
    pub fn invocations(&self) -> Vec<RecordedInvocation> {
        self.invocations.lock().clone()
    }

    /// Rendered command lines, in invocation order.
    pub fn rendered(&self) -> Vec<String> {
        self.invocations
            .lock()
            .iter()
            .map(|invocation| invocation.rendered.clone())
            .collect()
    }

    pub fn invocation_count(&self) -> usize {
        self.invocations.lock().len()
    }

    /// True if two invocations ever overlapped in time.
    pub fn overlap_detected(&self) -> bool {
        self.overlap_detected.load(Ordering::SeqCst)
    }
}

impl DeviceControlClient for RecordingClient {
    fn run(&self, command: &ControlCommand) -> Result<CommandOutput> {
        let rendered = command.render()?;

        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlap_detected.store(true, Ordering::SeqCst);
        }
        if let Some(duration) = *self.dwell.lock() {
            std::thread::sleep(duration);
        }

        self.invocations.lock().push(RecordedInvocation {
            command: command.clone(),
            rendered: rendered.clone(),
        });

        let result = if self.fail_spawn.load(Ordering::SeqCst) {
            Err(Error::ExecutionFailed(
                "device command failed to spawn (scripted)".to_string(),
            ))
        } else if self
            .fail_marker
            .lock()
            .as_deref()
            .is_some_and(|marker| rendered.contains(marker))
        {
            Ok(CommandOutput::failed())
        } else {
            let output = match command {
                ControlCommand::ListBootedDevices => {
                    CommandOutput::ok(self.booted_listing.lock().clone())
                }
                ControlCommand::ListDevices => {
                    CommandOutput::ok(self.device_listing.lock().clone())
                }
                _ => CommandOutput::ok(String::new()),
            };
            Ok(output)
        };

        self.in_flight.store(false, Ordering::SeqCst);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_commands_with_rendered_lines() {
        let client = RecordingClient::new();
        client.run(&ControlCommand::ListDevices).unwrap();
        client
            .run(&ControlCommand::Boot {
                device_id: "ABCD-1234".to_string(),
            })
            .unwrap();

        let invocations = client.invocations();
        assert_eq!(invocations.len(), 2);
        assert_eq!(invocations[0].rendered, "xcrun simctl list devices");
        assert_eq!(invocations[1].rendered, "xcrun simctl boot ABCD-1234");
    }

    #[test]
    fn scripted_failures_apply_by_marker() {
        let client = RecordingClient::new();
        client.fail_commands_containing("boot ");

        let output = client
            .run(&ControlCommand::Boot {
                device_id: "ABCD-1234".to_string(),
            })
            .unwrap();
        assert!(!output.success);

        let output = client.run(&ControlCommand::ListDevices).unwrap();
        assert!(output.success);
    }

    #[test]
    fn sequential_invocations_never_flag_overlap() {
        let client = RecordingClient::new();
        for _ in 0..5 {
            client.run(&ControlCommand::ListDevices).unwrap();
        }
        assert!(!client.overlap_detected());
    }
}
