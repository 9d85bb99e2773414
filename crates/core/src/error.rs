//! Error types for the bridge.

use simbridge_protocol::{ParseError, SnapshotDecodeError};
use thiserror::Error;

use crate::session::Lifecycle;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving the device bridge.
#[derive(Debug, Error)]
pub enum Error {
    /// The action name is not part of the fixed catalog.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// A request parameter is missing or has the wrong type.
    #[error("invalid parameter: {0}")]
    ParameterInvalid(String),

    /// No booted device was found during resolution.
    #[error("no booted device available")]
    NoDeviceAvailable,

    /// The entity/action pair is outside the fixed lifecycle set.
    #[error("unsupported lifecycle operation: {entity} {action}")]
    UnsupportedOperation { entity: String, action: String },

    /// The external tool could not be spawned, or a lifecycle command
    /// exited non-zero.
    #[error("device command failed: {0}")]
    ExecutionFailed(String),

    /// The rendered invocation exceeds the fixed command length cap.
    /// Over-long commands are rejected, never truncated.
    #[error("rendered command is {len} bytes, over the {max} byte limit")]
    CommandTooLong { len: usize, max: usize },

    /// The snapshot payload could not be decoded.
    #[error("snapshot corrupt: {0}")]
    SnapshotCorrupt(String),

    /// No checkpoint is stored under the given name.
    #[error("checkpoint not found: {0}")]
    CheckpointNotFound(String),

    /// The session has not been resolved to a device yet.
    #[error("session not ready: lifecycle is {0}")]
    SessionNotReady(Lifecycle),

    /// The spawned process outlived the caller-imposed deadline.
    #[error("device command timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnknownAction(name) => Error::UnknownAction(name),
            ParseError::ParameterInvalid(field) => Error::ParameterInvalid(field),
        }
    }
}

impl From<SnapshotDecodeError> for Error {
    fn from(err: SnapshotDecodeError) -> Self {
        Error::SnapshotCorrupt(err.to_string())
    }
}
