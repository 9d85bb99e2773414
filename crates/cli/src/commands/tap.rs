use anyhow::Result;
use simbridge::{DeviceBridge, DeviceControlClient};
use tracing::info;

use crate::output::print_json;

pub fn execute<C: DeviceControlClient>(bridge: &DeviceBridge<C>, x: f64, y: f64) -> Result<()> {
    info!(target = "simbridge", x, y, "tap");

    let params = serde_json::json!({ "x": x, "y": y });
    let result = bridge.execute_raw("tap", params.to_string().as_bytes())?;
    print_json(&result)
}
