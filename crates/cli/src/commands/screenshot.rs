use anyhow::Result;
use simbridge::{DeviceBridge, DeviceControlClient};
use tracing::info;

use crate::output::print_json;

pub fn execute<C: DeviceControlClient>(bridge: &DeviceBridge<C>, path: &str) -> Result<()> {
    info!(target = "simbridge", path, "screenshot");

    let params = serde_json::json!({ "path": path });
    let result = bridge.execute_raw("screenshot", params.to_string().as_bytes())?;
    print_json(&result)
}
