use anyhow::Result;
use simbridge::{DeviceBridge, DeviceControlClient};

use crate::output::print_json;

pub fn execute<C: DeviceControlClient>(bridge: &DeviceBridge<C>) -> Result<()> {
    let report = bridge.current_state()?;
    print_json(&report)
}
