//! Device automation bridge over an external simulator-control tool.
//!
//! `simbridge` accepts structured UI-action requests (tap, swipe, type
//! text, screenshot, query-state), translates them into invocations of the
//! external `simctl` tool, and reports structured results. A
//! [`DeviceSession`] binds one device/application pair for the duration of
//! a test run; snapshots capture and restore the session's bookkeeping for
//! deterministic replay.
//!
//! The external tool is always a black box behind the
//! [`DeviceControlClient`] capability trait: [`SimctlClient`] spawns real
//! processes, [`StubClient`] answers with canned neutral responses, and
//! [`testing::RecordingClient`] records invocations for assertions. All
//! three conform to the same contract, so callers can link against any of
//! them without code changes.

pub mod bridge;
pub mod client;
pub mod error;
pub mod executor;
pub mod inspector;
pub mod session;
pub mod snapshot;
pub mod testing;

pub use bridge::{DeviceBridge, SimulatorBridge, StubBridge};
pub use client::{
    CommandOutput, ControlCommand, DeviceControlClient, IoOperation, MAX_COMMAND_LEN,
    STUB_DEVICE_ID, SimctlClient, StubClient,
};
pub use error::{Error, Result};
pub use session::{DeviceSession, Lifecycle};

pub use simbridge_protocol as protocol;
