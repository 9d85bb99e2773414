use anyhow::Result;
use simbridge::{DeviceBridge, DeviceControlClient};
use tracing::info;

use crate::output::print_json;

pub fn execute<C: DeviceControlClient>(bridge: &DeviceBridge<C>, text: &str) -> Result<()> {
    info!(target = "simbridge", chars = text.len(), "type text");

    let params = serde_json::json!({ "text": text });
    let result = bridge.execute_raw("type_text", params.to_string().as_bytes())?;
    print_json(&result)
}
