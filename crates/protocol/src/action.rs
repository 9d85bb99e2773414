//! Action schema and parser.
//!
//! Decodes a raw `(action, params)` pair into one of the fixed set of
//! typed action descriptors. Validation is strict: a required field that
//! is missing or has the wrong type is rejected with the offending field
//! name, never silently defaulted. The only defaults are the two
//! documented optional fields: swipe `duration` (0.5s) and screenshot
//! `path` (`"screenshot.png"`).
//!
//! String fields are accepted as-is. Making them safe to embed in an
//! external invocation is the executor's job, not the parser's.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Swipe duration in seconds when the caller omits `duration`.
pub const DEFAULT_SWIPE_DURATION: f64 = 0.5;

/// Output path when a screenshot request omits `path`.
pub const DEFAULT_SCREENSHOT_PATH: &str = "screenshot.png";

/// Errors produced while parsing an action payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The action name is not one of the known kinds.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// A required field is missing or not convertible to its declared type.
    #[error("invalid parameter: {0}")]
    ParameterInvalid(String),
}

/// The fixed catalog of UI actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Tap,
    Swipe,
    TypeText,
    Screenshot,
    QueryUi,
}

impl ActionKind {
    /// Wire name of the action, as it appears in request and response
    /// payloads.
    pub fn wire_name(self) -> &'static str {
        match self {
            ActionKind::Tap => "tap",
            ActionKind::Swipe => "swipe",
            ActionKind::TypeText => "type_text",
            ActionKind::Screenshot => "screenshot",
            ActionKind::QueryUi => "query_ui",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Parameters for a tap at absolute screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapParams {
    pub x: f64,
    pub y: f64,
}

/// Parameters for a swipe between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwipeParams {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    /// Gesture duration in seconds.
    pub duration: f64,
}

/// Parameters for typing text into the focused element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTextParams {
    pub text: String,
}

/// Parameters for capturing a screenshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotParams {
    pub path: String,
}

/// A validated, typed action descriptor.
///
/// Constructed only by [`parse`], which guarantees that every required
/// field for the kind is present and well typed.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionRequest {
    Tap(TapParams),
    Swipe(SwipeParams),
    TypeText(TypeTextParams),
    Screenshot(ScreenshotParams),
    QueryUi,
}

impl ActionRequest {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionRequest::Tap(_) => ActionKind::Tap,
            ActionRequest::Swipe(_) => ActionKind::Swipe,
            ActionRequest::TypeText(_) => ActionKind::TypeText,
            ActionRequest::Screenshot(_) => ActionKind::Screenshot,
            ActionRequest::QueryUi => ActionKind::QueryUi,
        }
    }
}

/// Parses a raw action name and parameter payload into a typed request.
///
/// `raw_action` must match a known kind exactly (case-sensitive).
/// `raw_params` is expected to be a JSON object; a payload that cannot be
/// decoded is treated as empty, so required-field checks report the first
/// missing field rather than a separate payload error.
pub fn parse(raw_action: &str, raw_params: &[u8]) -> Result<ActionRequest, ParseError> {
    let params: Value = serde_json::from_slice(raw_params).unwrap_or(Value::Null);

    match raw_action {
        "tap" => Ok(ActionRequest::Tap(TapParams {
            x: required_number(&params, "x")?,
            y: required_number(&params, "y")?,
        })),
        "swipe" => Ok(ActionRequest::Swipe(SwipeParams {
            x1: required_number(&params, "x1")?,
            y1: required_number(&params, "y1")?,
            x2: required_number(&params, "x2")?,
            y2: required_number(&params, "y2")?,
            duration: swipe_duration(&params)?,
        })),
        "type_text" => Ok(ActionRequest::TypeText(TypeTextParams {
            text: required_string(&params, "text")?,
        })),
        "screenshot" => Ok(ActionRequest::Screenshot(ScreenshotParams {
            path: optional_string(&params, "path")?
                .unwrap_or_else(|| DEFAULT_SCREENSHOT_PATH.to_string()),
        })),
        "query_ui" => Ok(ActionRequest::QueryUi),
        other => Err(ParseError::UnknownAction(other.to_string())),
    }
}

fn required_number(params: &Value, field: &str) -> Result<f64, ParseError> {
    match params.get(field) {
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ParseError::ParameterInvalid(field.to_string())),
        _ => Err(ParseError::ParameterInvalid(field.to_string())),
    }
}

fn optional_number(params: &Value, field: &str) -> Result<Option<f64>, ParseError> {
    match params.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => required_number(params, field).map(Some),
    }
}

fn swipe_duration(params: &Value) -> Result<f64, ParseError> {
    let duration = optional_number(params, "duration")?.unwrap_or(DEFAULT_SWIPE_DURATION);
    if duration < 0.0 {
        return Err(ParseError::ParameterInvalid("duration".to_string()));
    }
    Ok(duration)
}

fn required_string(params: &Value, field: &str) -> Result<String, ParseError> {
    match params.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(ParseError::ParameterInvalid(field.to_string())),
    }
}

fn optional_string(params: &Value, field: &str) -> Result<Option<String>, ParseError> {
    match params.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ParseError::ParameterInvalid(field.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_tap() {
        let request = parse("tap", br#"{"x": 100, "y": 250}"#).unwrap();
        assert_eq!(
            request,
            ActionRequest::Tap(TapParams { x: 100.0, y: 250.0 })
        );
        assert_eq!(request.kind(), ActionKind::Tap);
    }

    #[test]
    fn tap_missing_y_is_parameter_invalid() {
        let err = parse("tap", br#"{"x": 100}"#).unwrap_err();
        assert_eq!(err, ParseError::ParameterInvalid("y".to_string()));
    }

    #[test]
    fn tap_non_numeric_coordinate_is_parameter_invalid() {
        let err = parse("tap", br#"{"x": "100", "y": 250}"#).unwrap_err();
        assert_eq!(err, ParseError::ParameterInvalid("x".to_string()));
    }

    #[test]
    fn unknown_action_is_rejected() {
        let err = parse("pinch", br#"{"scale": 2.0}"#).unwrap_err();
        assert_eq!(err, ParseError::UnknownAction("pinch".to_string()));
    }

    #[test]
    fn action_match_is_case_sensitive() {
        let err = parse("Tap", br#"{"x": 1, "y": 2}"#).unwrap_err();
        assert_eq!(err, ParseError::UnknownAction("Tap".to_string()));
    }

    #[test]
    fn garbage_payload_reports_first_required_field() {
        let err = parse("tap", b"not json at all").unwrap_err();
        assert_eq!(err, ParseError::ParameterInvalid("x".to_string()));
    }

    #[test]
    fn swipe_defaults_duration_only() {
        let request = parse("swipe", br#"{"x1": 0, "y1": 0, "x2": 50, "y2": 50}"#).unwrap();
        let ActionRequest::Swipe(params) = request else {
            panic!("expected swipe");
        };
        assert_eq!(params.duration, DEFAULT_SWIPE_DURATION);

        let err = parse("swipe", br#"{"x1": 0, "y1": 0, "x2": 50}"#).unwrap_err();
        assert_eq!(err, ParseError::ParameterInvalid("y2".to_string()));
    }

    #[test]
    fn swipe_rejects_negative_duration() {
        let err = parse(
            "swipe",
            br#"{"x1": 0, "y1": 0, "x2": 50, "y2": 50, "duration": -1}"#,
        )
        .unwrap_err();
        assert_eq!(err, ParseError::ParameterInvalid("duration".to_string()));
    }

    #[test]
    fn type_text_keeps_payload_untouched() {
        let request = parse("type_text", br#"{"text": "it's a \"test\"\\"}"#).unwrap();
        let ActionRequest::TypeText(params) = request else {
            panic!("expected type_text");
        };
        // Quotes and backslashes survive parsing verbatim; escaping is the
        // executor's concern.
        assert_eq!(params.text, r#"it's a "test"\"#);
    }

    #[test]
    fn type_text_requires_string_text() {
        let err = parse("type_text", br#"{"text": 42}"#).unwrap_err();
        assert_eq!(err, ParseError::ParameterInvalid("text".to_string()));

        let err = parse("type_text", b"{}").unwrap_err();
        assert_eq!(err, ParseError::ParameterInvalid("text".to_string()));
    }

    #[test]
    fn screenshot_path_defaults_when_omitted() {
        let request = parse("screenshot", b"{}").unwrap();
        assert_eq!(
            request,
            ActionRequest::Screenshot(ScreenshotParams {
                path: DEFAULT_SCREENSHOT_PATH.to_string()
            })
        );

        let request = parse("screenshot", br#"{"path": "shots/login.png"}"#).unwrap();
        assert_eq!(
            request,
            ActionRequest::Screenshot(ScreenshotParams {
                path: "shots/login.png".to_string()
            })
        );
    }

    #[test]
    fn query_ui_takes_no_parameters() {
        assert_eq!(parse("query_ui", b"").unwrap(), ActionRequest::QueryUi);
        assert_eq!(parse("query_ui", b"{}").unwrap(), ActionRequest::QueryUi);
    }
}
