use anyhow::Result;
use simbridge::{DeviceBridge, DeviceControlClient};
use tracing::info;

use crate::output::print_json;

pub fn execute<C: DeviceControlClient>(
    bridge: &DeviceBridge<C>,
    entity: &str,
    action: &str,
) -> Result<()> {
    info!(target = "simbridge", entity, action, "device lifecycle");

    match bridge.mutate(entity, action) {
        Ok(()) => print_json(&serde_json::json!({ "success": true })),
        Err(err) => {
            print_json(&serde_json::json!({
                "success": false,
                "error": err.to_string()
            }))?;
            Err(err.into())
        }
    }
}
