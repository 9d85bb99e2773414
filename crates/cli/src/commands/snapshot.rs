use std::fs;

use anyhow::{Context, Result};
use simbridge::{DeviceBridge, DeviceControlClient};
use tracing::info;

use crate::cli::SnapshotCommands;
use crate::output::print_json;

pub fn execute<C: DeviceControlClient>(
    bridge: &DeviceBridge<C>,
    command: SnapshotCommands,
) -> Result<()> {
    match command {
        SnapshotCommands::Capture { path } => {
            let buffer = bridge.capture()?;
            fs::write(&path, &buffer)
                .with_context(|| format!("writing snapshot to {}", path.display()))?;
            info!(target = "simbridge", path = %path.display(), bytes = buffer.len(), "snapshot written");
            print_json(&serde_json::json!({
                "success": true,
                "path": path,
                "bytes": buffer.len()
            }))
        }
        SnapshotCommands::Restore { path } => {
            let buffer = fs::read(&path)
                .with_context(|| format!("reading snapshot from {}", path.display()))?;
            bridge.restore(&buffer)?;
            print_json(&serde_json::json!({
                "success": true,
                "device_id": bridge.device_id(),
                "bundle_id": bridge.bundle_id()
            }))
        }
    }
}
