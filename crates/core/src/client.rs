//! Device control client: the capability boundary to the external tool.
//!
//! Every external invocation is described by a [`ControlCommand`] and
//! rendered to a single `xcrun simctl` command line in one place, so the
//! escaping and length rules live here and nowhere else. The argument
//! surface of the rendered lines is the wire contract with the tool and
//! must not drift.
//!
//! [`SimctlClient`] runs rendered lines through `/bin/sh -c` and
//! classifies the outcome strictly by exit status. [`StubClient`] conforms
//! to the identical trait with canned neutral responses so callers can
//! link against either without code changes.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Error, Result};

/// Upper bound on a rendered command line, in bytes.
pub const MAX_COMMAND_LEN: usize = 2048;

/// Device id reported by [`StubClient`].
pub const STUB_DEVICE_ID: &str = "STUB-0000-0000-0000";

/// One UI operation against a booted device (`simctl io ...`).
#[derive(Debug, Clone, PartialEq)]
pub enum IoOperation {
    Tap { x: f64, y: f64 },
    Swipe { x1: f64, y1: f64, x2: f64, y2: f64, duration: f64 },
    Type { text: String },
    Screenshot { path: String },
}

/// Structured description of one external tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    /// JSON listing of booted devices, used for resolution.
    ListBootedDevices,
    /// Free-text device listing, used for state queries.
    ListDevices,
    /// UI action against a booted device.
    Io {
        device_id: String,
        operation: IoOperation,
    },
    /// Read-only accessibility dump.
    DumpAccessibility { device_id: String },
    Boot { device_id: String },
    Shutdown { device_id: String },
    Launch { device_id: String, bundle_id: String },
    Terminate { device_id: String, bundle_id: String },
}

impl ControlCommand {
    /// Renders the `xcrun simctl` command line for this descriptor.
    ///
    /// Numbers are formatted with fixed precision; user-provided strings
    /// are escaped and single-quoted. A line longer than
    /// [`MAX_COMMAND_LEN`] is rejected with [`Error::CommandTooLong`].
    pub fn render(&self) -> Result<String> {
        let line = match self {
            ControlCommand::ListBootedDevices => {
                "xcrun simctl list devices booted -j".to_string()
            }
            ControlCommand::ListDevices => "xcrun simctl list devices".to_string(),
            ControlCommand::Io {
                device_id,
                operation,
            } => match operation {
                IoOperation::Tap { x, y } => {
                    format!("xcrun simctl io {device_id} tap {x:.0} {y:.0}")
                }
                IoOperation::Swipe {
                    x1,
                    y1,
                    x2,
                    y2,
                    duration,
                } => format!(
                    "xcrun simctl io {device_id} swipe {x1:.0} {y1:.0} {x2:.0} {y2:.0} \
                     --duration={duration:.2}"
                ),
                IoOperation::Type { text } => format!(
                    "xcrun simctl io {device_id} type '{}'",
                    escape_shell_text(text)
                ),
                IoOperation::Screenshot { path } => format!(
                    "xcrun simctl io {device_id} screenshot '{}'",
                    escape_shell_text(path)
                ),
            },
            ControlCommand::DumpAccessibility { device_id } => format!(
                "xcrun simctl launch {device_id} com.apple.Accessibility.AccessibilityUtility \
                 --dump"
            ),
            ControlCommand::Boot { device_id } => format!("xcrun simctl boot {device_id}"),
            ControlCommand::Shutdown { device_id } => {
                format!("xcrun simctl shutdown {device_id}")
            }
            ControlCommand::Launch {
                device_id,
                bundle_id,
            } => format!("xcrun simctl launch {device_id} {bundle_id}"),
            ControlCommand::Terminate {
                device_id,
                bundle_id,
            } => format!("xcrun simctl terminate {device_id} {bundle_id}"),
        };

        if line.len() > MAX_COMMAND_LEN {
            return Err(Error::CommandTooLong {
                len: line.len(),
                max: MAX_COMMAND_LEN,
            });
        }
        Ok(line)
    }
}

/// Escapes a string for single-quoted embedding in a command line.
///
/// Every single quote, double quote, and backslash is prefixed with a
/// backslash. This is the only place request strings are made
/// invocation-safe; the parser deliberately leaves them untouched.
fn escape_shell_text(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\'' | '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Captured outcome of one external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Captured stdout, lossily decoded.
    pub stdout: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        CommandOutput {
            success: true,
            stdout: stdout.into(),
        }
    }

    pub fn failed() -> Self {
        CommandOutput {
            success: false,
            stdout: String::new(),
        }
    }
}

/// Capability interface to the external device-control tool.
///
/// `run` returns `Ok` with the exit classification whenever the tool could
/// be invoked at all; `Err` is reserved for invocations that never ran to
/// completion (unrenderable command, spawn failure, caller-imposed
/// timeout).
pub trait DeviceControlClient: Send + Sync {
    fn run(&self, command: &ControlCommand) -> Result<CommandOutput>;
}

impl<C: DeviceControlClient + ?Sized> DeviceControlClient for &C {
    fn run(&self, command: &ControlCommand) -> Result<CommandOutput> {
        (**self).run(command)
    }
}

impl<C: DeviceControlClient + ?Sized> DeviceControlClient for Box<C> {
    fn run(&self, command: &ControlCommand) -> Result<CommandOutput> {
        (**self).run(command)
    }
}

/// Real client: renders commands and runs them through `/bin/sh -c`.
#[derive(Debug, Clone, Default)]
pub struct SimctlClient {
    timeout: Option<Duration>,
}

impl SimctlClient {
    pub fn new() -> Self {
        SimctlClient::default()
    }

    /// Kills a spawned process that outlives `timeout` and fails the
    /// invocation with [`Error::Timeout`].
    pub fn with_timeout(timeout: Duration) -> Self {
        SimctlClient {
            timeout: Some(timeout),
        }
    }
}

impl DeviceControlClient for SimctlClient {
    fn run(&self, command: &ControlCommand) -> Result<CommandOutput> {
        let line = command.render()?;
        debug!(target = "simbridge", command = %line, "spawn device command");

        let mut child = Command::new("/bin/sh")
            .arg("-c")
            .arg(&line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| {
                Error::ExecutionFailed(format!("failed to spawn device command: {err}"))
            })?;

        // Drain stdout on a separate thread so a chatty command cannot
        // block on a full pipe while we wait for it to exit.
        let reader = child.stdout.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut buffer = Vec::new();
                let _ = pipe.read_to_end(&mut buffer);
                buffer
            })
        });

        let status = match self.timeout {
            None => child.wait()?,
            Some(limit) => wait_with_deadline(&mut child, limit)?,
        };

        let stdout = reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        Ok(CommandOutput {
            success: status.success(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
        })
    }
}

fn wait_with_deadline(child: &mut Child, limit: Duration) -> Result<ExitStatus> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::Timeout {
                ms: limit.as_millis() as u64,
            });
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

/// No-op client returning canned neutral responses.
///
/// Commands are still rendered first, so [`Error::CommandTooLong`] stays
/// observable without any simulator tooling installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubClient;

impl DeviceControlClient for StubClient {
    fn run(&self, command: &ControlCommand) -> Result<CommandOutput> {
        command.render()?;
        let output = match command {
            ControlCommand::ListBootedDevices => CommandOutput::ok(format!(
                r#"{{"devices":{{"stub-runtime":[{{"udid":"{STUB_DEVICE_ID}","state":"Booted","name":"Stub Device"}}]}}}}"#
            )),
            ControlCommand::ListDevices => {
                CommandOutput::ok(format!("    Stub Device ({STUB_DEVICE_ID}) (Booted)"))
            }
            _ => CommandOutput::ok(String::new()),
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn io(operation: IoOperation) -> ControlCommand {
        ControlCommand::Io {
            device_id: "ABCD-1234".to_string(),
            operation,
        }
    }

    #[test]
    fn tap_renders_legacy_argument_surface() {
        let line = io(IoOperation::Tap { x: 100.4, y: 250.6 }).render().unwrap();
        assert_eq!(line, "xcrun simctl io ABCD-1234 tap 100 251");
    }

    #[test]
    fn swipe_renders_fixed_precision() {
        let line = io(IoOperation::Swipe {
            x1: 0.0,
            y1: 0.0,
            x2: 50.0,
            y2: 120.0,
            duration: 0.5,
        })
        .render()
        .unwrap();
        assert_eq!(
            line,
            "xcrun simctl io ABCD-1234 swipe 0 0 50 120 --duration=0.50"
        );
    }

    #[test]
    fn lifecycle_commands_render_expected_lines() {
        let boot = ControlCommand::Boot {
            device_id: "ABCD-1234".to_string(),
        };
        assert_eq!(boot.render().unwrap(), "xcrun simctl boot ABCD-1234");

        let launch = ControlCommand::Launch {
            device_id: "ABCD-1234".to_string(),
            bundle_id: "com.example.app".to_string(),
        };
        assert_eq!(
            launch.render().unwrap(),
            "xcrun simctl launch ABCD-1234 com.example.app"
        );
    }

    #[test]
    fn type_text_escapes_every_quote_and_backslash() {
        let line = io(IoOperation::Type {
            text: r#"it's a "test"\"#.to_string(),
        })
        .render()
        .unwrap();
        assert_eq!(
            line,
            r#"xcrun simctl io ABCD-1234 type 'it\'s a \"test\"\\'"#
        );

        // Injection-safety: inside the quoted argument, no quote may appear
        // without its escape marker.
        let argument = line
            .split_once(" type '")
            .map(|(_, rest)| rest)
            .unwrap()
            .strip_suffix('\'')
            .unwrap();
        let chars: Vec<char> = argument.chars().collect();
        for (i, c) in chars.iter().enumerate() {
            if matches!(c, '\'' | '"') {
                assert_eq!(chars.get(i.wrapping_sub(1)), Some(&'\\'), "unescaped quote");
            }
        }
    }

    #[test]
    fn screenshot_path_goes_through_the_same_escaping() {
        let line = io(IoOperation::Screenshot {
            path: "shots/it's.png".to_string(),
        })
        .render()
        .unwrap();
        assert_eq!(
            line,
            r#"xcrun simctl io ABCD-1234 screenshot 'shots/it\'s.png'"#
        );
    }

    #[test]
    fn over_long_command_is_rejected_not_truncated() {
        let err = io(IoOperation::Type {
            text: "x".repeat(MAX_COMMAND_LEN),
        })
        .render()
        .unwrap_err();
        assert!(matches!(err, Error::CommandTooLong { len, max }
            if len > MAX_COMMAND_LEN && max == MAX_COMMAND_LEN));
    }

    #[test]
    fn escape_doubles_nothing_else() {
        assert_eq!(escape_shell_text("plain text 123"), "plain text 123");
        assert_eq!(escape_shell_text(r#"a'b"c\d"#), r#"a\'b\"c\\d"#);
    }

    #[test]
    fn stub_reports_one_booted_device() {
        let output = StubClient.run(&ControlCommand::ListBootedDevices).unwrap();
        assert!(output.success);
        let listing: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
        assert_eq!(
            listing["devices"]["stub-runtime"][0]["udid"],
            STUB_DEVICE_ID
        );

        let output = StubClient
            .run(&ControlCommand::Boot {
                device_id: STUB_DEVICE_ID.to_string(),
            })
            .unwrap();
        assert!(output.success);
        assert!(output.stdout.is_empty());
    }

    #[test]
    fn stub_still_enforces_the_length_cap() {
        let err = StubClient
            .run(&io(IoOperation::Type {
                text: "y".repeat(MAX_COMMAND_LEN),
            }))
            .unwrap_err();
        assert!(matches!(err, Error::CommandTooLong { .. }));
    }
}
