//! Public bridge facade.
//!
//! [`DeviceBridge`] owns its session behind a per-session lock: every
//! operation holds the lock for its full duration, so at most one external
//! invocation is in flight per session and concurrent callers can never
//! interleave two invocations against the same device. Resolution is an
//! explicit caller step; no operation lazily initializes the session.

use std::collections::HashMap;

use parking_lot::Mutex;
use simbridge_protocol::{
    ActionRequest, ActionResult, SessionStateReport, SnapshotPayload, TreeReport, parse,
};

use crate::client::{DeviceControlClient, SimctlClient, StubClient};
use crate::error::{Error, Result};
use crate::session::{DeviceSession, Lifecycle};
use crate::{executor, inspector, session, snapshot};

/// Bridge backed by the real simulator tooling.
pub type SimulatorBridge = DeviceBridge<SimctlClient>;

/// Bridge backed by canned responses; spawns nothing.
pub type StubBridge = DeviceBridge<StubClient>;

/// The device automation bridge: one session, one device, one invocation
/// at a time.
pub struct DeviceBridge<C: DeviceControlClient> {
    client: C,
    session: Mutex<DeviceSession>,
    checkpoints: Mutex<HashMap<String, Vec<u8>>>,
}

impl<C: DeviceControlClient> DeviceBridge<C> {
    pub fn new(bundle_id: impl Into<String>, client: C) -> Self {
        DeviceBridge {
            client,
            session: Mutex::new(DeviceSession::new(bundle_id)),
            checkpoints: Mutex::new(HashMap::new()),
        }
    }

    /// Binds the session to the first booted device. Explicit: actions
    /// called before this succeed report the session as not ready.
    pub fn resolve(&self) -> Result<()> {
        session::resolve(&mut self.session.lock(), &self.client)
    }

    /// Clears the session identity and re-arms resolution.
    pub fn reset(&self) {
        self.session.lock().reset();
    }

    pub fn device_id(&self) -> Option<String> {
        self.session.lock().device_id().map(str::to_string)
    }

    pub fn bundle_id(&self) -> String {
        self.session.lock().bundle_id().to_string()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.session.lock().lifecycle()
    }

    /// Executes one typed request.
    pub fn execute(&self, request: &ActionRequest) -> Result<ActionResult> {
        let session = self.session.lock();
        executor::execute(&session, &self.client, request)
    }

    /// Parses and executes a raw protocol payload.
    ///
    /// Parse failures are returned before anything is invoked.
    pub fn execute_raw(&self, raw_action: &str, raw_params: &[u8]) -> Result<ActionResult> {
        let request = parse(raw_action, raw_params)?;
        self.execute(&request)
    }

    /// Issues one lifecycle mutation from the fixed entity/action set.
    pub fn mutate(&self, entity: &str, action: &str) -> Result<()> {
        session::mutate(&mut self.session.lock(), &self.client, entity, action)
    }

    /// Reports the session device's classified power state.
    pub fn current_state(&self) -> Result<SessionStateReport> {
        let session = self.session.lock();
        inspector::current_state(&session, &self.client)
    }

    /// Returns the fixed accessibility tree shape for the session bundle.
    pub fn query_ui(&self) -> Result<TreeReport> {
        let session = self.session.lock();
        inspector::query_ui(&session, &self.client)
    }

    /// Captures the session into an opaque length-prefixed buffer.
    pub fn capture(&self) -> Result<Vec<u8>> {
        let session = self.session.lock();
        Ok(snapshot::capture(&session)?.to_bytes())
    }

    /// Restores session identity from a buffer produced by [`capture`].
    ///
    /// A buffer that does not decode leaves the session in its prior
    /// state.
    ///
    /// [`capture`]: DeviceBridge::capture
    pub fn restore(&self, bytes: &[u8]) -> Result<()> {
        let payload = SnapshotPayload::from_bytes(bytes)?;
        snapshot::restore(&mut self.session.lock(), &payload)
    }

    /// Captures the session under a name for later in-process restore.
    pub fn checkpoint(&self, name: &str) -> Result<()> {
        let bytes = self.capture()?;
        self.checkpoints.lock().insert(name.to_string(), bytes);
        Ok(())
    }

    /// Restores the session from a named checkpoint.
    pub fn restore_checkpoint(&self, name: &str) -> Result<()> {
        let bytes = self
            .checkpoints
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::CheckpointNotFound(name.to_string()))?;
        self.restore(&bytes)
    }

    /// Copies an existing checkpoint under a new name.
    pub fn branch(&self, from: &str, to: &str) -> Result<()> {
        let mut checkpoints = self.checkpoints.lock();
        let bytes = checkpoints
            .get(from)
            .cloned()
            .ok_or_else(|| Error::CheckpointNotFound(from.to_string()))?;
        checkpoints.insert(to.to_string(), bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::STUB_DEVICE_ID;
    use crate::testing::RecordingClient;

    #[test]
    fn stub_bridge_supports_the_full_surface_without_processes() {
        let bridge = DeviceBridge::new("com.example.app", StubClient);
        bridge.resolve().unwrap();
        assert_eq!(bridge.device_id().as_deref(), Some(STUB_DEVICE_ID));

        let result = bridge.execute_raw("tap", br#"{"x": 10, "y": 20}"#).unwrap();
        assert!(result.success());

        bridge.mutate("app", "launch").unwrap();
        let report = bridge.current_state().unwrap();
        assert_eq!(report.device_id, STUB_DEVICE_ID);

        let tree = bridge.query_ui().unwrap();
        assert_eq!(tree.root.bundle_id, "com.example.app");
    }

    #[test]
    fn unknown_action_is_rejected_before_any_invocation() {
        let client = RecordingClient::new();
        let bridge = DeviceBridge::new("com.example.app", &client);
        bridge.resolve().unwrap();
        let before = client.invocation_count();

        let err = bridge.execute_raw("pinch", br#"{"scale": 2}"#).unwrap_err();
        assert!(matches!(err, Error::UnknownAction(name) if name == "pinch"));
        assert_eq!(client.invocation_count(), before);
    }

    #[test]
    fn parameter_errors_are_rejected_before_any_invocation() {
        let client = RecordingClient::new();
        let bridge = DeviceBridge::new("com.example.app", &client);
        bridge.resolve().unwrap();
        let before = client.invocation_count();

        let err = bridge.execute_raw("tap", br#"{"x": 100}"#).unwrap_err();
        assert!(matches!(err, Error::ParameterInvalid(field) if field == "y"));
        assert_eq!(client.invocation_count(), before);
    }

    #[test]
    fn checkpoint_restore_and_branch() {
        let bridge = DeviceBridge::new("com.example.app", StubClient);
        bridge.resolve().unwrap();
        bridge.checkpoint("start").unwrap();

        bridge.mutate("simulator", "shutdown").unwrap();
        assert_eq!(bridge.lifecycle(), Lifecycle::ShutDown);

        bridge.restore_checkpoint("start").unwrap();
        assert_eq!(bridge.lifecycle(), Lifecycle::Resolved);
        assert_eq!(bridge.device_id().as_deref(), Some(STUB_DEVICE_ID));

        bridge.branch("start", "alt").unwrap();
        bridge.restore_checkpoint("alt").unwrap();

        let err = bridge.restore_checkpoint("missing").unwrap_err();
        assert!(matches!(err, Error::CheckpointNotFound(_)));
        let err = bridge.branch("missing", "copy").unwrap_err();
        assert!(matches!(err, Error::CheckpointNotFound(_)));
    }

    #[test]
    fn corrupt_snapshot_leaves_session_untouched() {
        let bridge = DeviceBridge::new("com.example.app", StubClient);
        bridge.resolve().unwrap();
        let device_before = bridge.device_id();

        let err = bridge.restore(b"\x02\x00\x00\x00{}").unwrap_err();
        assert!(matches!(err, Error::SnapshotCorrupt(_)));
        assert_eq!(bridge.device_id(), device_before);
        assert_eq!(bridge.lifecycle(), Lifecycle::Active);
    }
}
