//! Maps validated action descriptors onto external invocations.
//!
//! Exactly one invocation is built per request, from values that already
//! passed type checking; the rendering and escaping rules live in the
//! client layer. Success is classified strictly by exit status. Failures
//! of the invocation itself are folded into the returned [`ActionResult`]
//! so a failed device command never aborts the caller; only pre-invocation
//! failures (unresolved session, over-long command) propagate as errors.

use simbridge_protocol::{ActionEcho, ActionRequest, ActionResult};
use tracing::debug;

use crate::client::{ControlCommand, DeviceControlClient, IoOperation};
use crate::error::{Error, Result};
use crate::inspector;
use crate::session::DeviceSession;

/// Executes one validated request against the session's device.
pub fn execute(
    session: &DeviceSession,
    client: &impl DeviceControlClient,
    request: &ActionRequest,
) -> Result<ActionResult> {
    let device_id = session.require_device()?.to_string();
    debug!(target = "simbridge", action = %request.kind(), "execute action");

    let (operation, echo) = match request {
        ActionRequest::Tap(p) => (
            IoOperation::Tap { x: p.x, y: p.y },
            ActionEcho::Tap { x: p.x, y: p.y },
        ),
        ActionRequest::Swipe(p) => (
            IoOperation::Swipe {
                x1: p.x1,
                y1: p.y1,
                x2: p.x2,
                y2: p.y2,
                duration: p.duration,
            },
            ActionEcho::Swipe,
        ),
        ActionRequest::TypeText(p) => (
            IoOperation::Type {
                text: p.text.clone(),
            },
            ActionEcho::TypeText {
                text: p.text.clone(),
            },
        ),
        ActionRequest::Screenshot(p) => (
            IoOperation::Screenshot {
                path: p.path.clone(),
            },
            ActionEcho::Screenshot {
                path: p.path.clone(),
            },
        ),
        ActionRequest::QueryUi => {
            let tree = inspector::query_ui(session, client)?;
            return Ok(ActionResult::completed(ActionEcho::QueryUi { tree }));
        }
    };

    let command = ControlCommand::Io {
        device_id,
        operation,
    };
    match client.run(&command) {
        Ok(output) if output.success => Ok(ActionResult::completed(echo)),
        Ok(_) => Ok(ActionResult::failed(
            echo,
            format!("{} command failed", request.kind()),
        )),
        // An unrenderable command never ran; report it as a hard error
        // rather than a device failure.
        Err(err @ Error::CommandTooLong { .. }) => Err(err),
        Err(err) => Ok(ActionResult::failed(echo, err.to_string())),
    }
}
