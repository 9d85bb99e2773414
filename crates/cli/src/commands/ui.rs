use anyhow::Result;
use simbridge::{DeviceBridge, DeviceControlClient};

use crate::output::print_json;

pub fn execute<C: DeviceControlClient>(bridge: &DeviceBridge<C>) -> Result<()> {
    let result = bridge.execute_raw("query_ui", b"{}")?;
    print_json(&result)
}
