//! Response shapes reported back to the caller.
//!
//! The serialized forms are a compatibility contract: each action kind has
//! its own historical shape (tap echoes `coordinates`, screenshot echoes
//! `path` with no `action` key, query_ui returns a bare `tree` object), so
//! [`ActionResult`] carries a typed echo and serializes it by hand instead
//! of deriving a uniform envelope.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::action::ActionKind;

/// Screen coordinates echoed back by tap results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

/// One node of the fixed accessibility tree shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(rename = "bundleId")]
    pub bundle_id: String,
    pub children: Vec<TreeNode>,
}

/// Accessibility tree report returned by query_ui.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeReport {
    pub root: TreeNode,
}

impl TreeReport {
    /// The placeholder tree: a single application root with no children.
    pub fn placeholder(bundle_id: impl Into<String>) -> Self {
        TreeReport {
            root: TreeNode {
                node_type: "Application".to_string(),
                bundle_id: bundle_id.into(),
                children: Vec::new(),
            },
        }
    }
}

/// Classified power state of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceState {
    Booted,
    Shutdown,
    /// The listing succeeded but reported a status outside the known set.
    /// A valid outcome, not an error.
    Unknown,
}

impl std::fmt::Display for DeviceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceState::Booted => f.write_str("booted"),
            DeviceState::Shutdown => f.write_str("shutdown"),
            DeviceState::Unknown => f.write_str("unknown"),
        }
    }
}

/// Report returned by the state query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStateReport {
    pub device_id: String,
    pub state: DeviceState,
    pub bundle_id: String,
}

/// Normalized parameters echoed with an action's outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionEcho {
    Tap { x: f64, y: f64 },
    Swipe,
    TypeText { text: String },
    Screenshot { path: String },
    QueryUi { tree: TreeReport },
}

impl ActionEcho {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionEcho::Tap { .. } => ActionKind::Tap,
            ActionEcho::Swipe => ActionKind::Swipe,
            ActionEcho::TypeText { .. } => ActionKind::TypeText,
            ActionEcho::Screenshot { .. } => ActionKind::Screenshot,
            ActionEcho::QueryUi { .. } => ActionKind::QueryUi,
        }
    }
}

/// Outcome of executing one action.
///
/// The constructors enforce the result invariant: a failed result always
/// carries an error message, a completed one never does. The echo is
/// present in both cases so callers see the normalized parameters
/// regardless of execution outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    success: bool,
    echo: ActionEcho,
    error: Option<String>,
}

impl ActionResult {
    pub fn completed(echo: ActionEcho) -> Self {
        ActionResult {
            success: true,
            echo,
            error: None,
        }
    }

    pub fn failed(echo: ActionEcho, error: impl Into<String>) -> Self {
        let error = error.into();
        debug_assert!(!error.is_empty());
        ActionResult {
            success: false,
            echo,
            error: Some(error),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn echo(&self) -> &ActionEcho {
        &self.echo
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl Serialize for ActionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // query_ui keeps its legacy bare-tree shape; everything else is a
        // success flag plus the kind-specific echo fields.
        if let ActionEcho::QueryUi { tree } = &self.echo {
            let mut map = serializer.serialize_map(Some(1))?;
            map.serialize_entry("tree", tree)?;
            return map.end();
        }

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("success", &self.success)?;
        match &self.echo {
            ActionEcho::Tap { x, y } => {
                map.serialize_entry("action", "tap")?;
                map.serialize_entry("coordinates", &Coordinates { x: *x, y: *y })?;
            }
            ActionEcho::Swipe => {
                map.serialize_entry("action", "swipe")?;
            }
            ActionEcho::TypeText { text } => {
                map.serialize_entry("action", "type_text")?;
                map.serialize_entry("text", text)?;
            }
            ActionEcho::Screenshot { path } => {
                map.serialize_entry("path", path)?;
            }
            ActionEcho::QueryUi { .. } => unreachable!("handled above"),
        }
        if let Some(error) = &self.error {
            map.serialize_entry("error", error)?;
        }
        map.end()
    }
}
