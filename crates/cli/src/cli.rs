use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "simbridge")]
#[command(about = "Device automation bridge for simulator-driven UI testing")]
#[command(version)]
pub struct Cli {
    /// Enable debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Application bundle identifier the session is bound to
    #[arg(
        short = 'b',
        long,
        global = true,
        env = "SIMBRIDGE_BUNDLE_ID",
        default_value = "com.example.app"
    )]
    pub bundle_id: String,

    /// Use the no-op stub client instead of real simulator tooling
    #[arg(long, global = true)]
    pub stub: bool,

    /// Kill an external command running longer than this many milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Tap at screen coordinates
    Tap { x: f64, y: f64 },

    /// Swipe between two points
    Swipe {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        /// Gesture duration in seconds
        #[arg(long, default_value_t = 0.5)]
        duration: f64,
    },

    /// Type text into the focused element
    #[command(name = "type")]
    TypeText { text: String },

    /// Capture a screenshot on the device
    Screenshot {
        /// Output path on the host
        #[arg(default_value = "screenshot.png")]
        path: String,
    },

    /// Print the accessibility tree for the session bundle
    Ui,

    /// Report the session device's power state
    State,

    /// Boot/shutdown the simulator or launch/terminate the app
    Device {
        /// Target entity: simulator or app
        entity: String,
        /// Lifecycle action: boot, shutdown, launch, terminate
        action: String,
    },

    /// Capture or restore a session snapshot
    Snapshot {
        #[command(subcommand)]
        command: SnapshotCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum SnapshotCommands {
    /// Write a snapshot of the current session to a file
    Capture { path: PathBuf },
    /// Restore session fields from a snapshot file
    Restore { path: PathBuf },
}
