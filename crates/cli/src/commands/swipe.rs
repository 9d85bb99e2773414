use anyhow::Result;
use simbridge::{DeviceBridge, DeviceControlClient};
use tracing::info;

use crate::output::print_json;

pub fn execute<C: DeviceControlClient>(
    bridge: &DeviceBridge<C>,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    duration: f64,
) -> Result<()> {
    info!(target = "simbridge", x1, y1, x2, y2, duration, "swipe");

    let params = serde_json::json!({
        "x1": x1, "y1": y1, "x2": x2, "y2": y2, "duration": duration
    });
    let result = bridge.execute_raw("swipe", params.to_string().as_bytes())?;
    print_json(&result)
}
