mod device;
mod screenshot;
mod snapshot;
mod state;
mod swipe;
mod tap;
mod text;
mod ui;

use std::time::Duration;

use anyhow::Result;
use simbridge::{DeviceBridge, DeviceControlClient, SimctlClient, StubClient};

use crate::cli::{Cli, Commands, SnapshotCommands};

pub fn dispatch(cli: Cli) -> Result<()> {
    let Cli {
        verbose: _,
        bundle_id,
        stub,
        timeout_ms,
        command,
    } = cli;

    let client: Box<dyn DeviceControlClient> = if stub {
        Box::new(StubClient)
    } else {
        match timeout_ms {
            Some(ms) => Box::new(SimctlClient::with_timeout(Duration::from_millis(ms))),
            None => Box::new(SimctlClient::new()),
        }
    };
    let bridge = DeviceBridge::new(bundle_id, client);

    // Restore repopulates the session itself; everything else binds to a
    // booted device first.
    if !matches!(
        command,
        Commands::Snapshot {
            command: SnapshotCommands::Restore { .. }
        }
    ) {
        bridge.resolve()?;
    }

    match command {
        Commands::Tap { x, y } => tap::execute(&bridge, x, y),
        Commands::Swipe {
            x1,
            y1,
            x2,
            y2,
            duration,
        } => swipe::execute(&bridge, x1, y1, x2, y2, duration),
        Commands::TypeText { text } => text::execute(&bridge, &text),
        Commands::Screenshot { path } => screenshot::execute(&bridge, &path),
        Commands::Ui => ui::execute(&bridge),
        Commands::State => state::execute(&bridge),
        Commands::Device { entity, action } => device::execute(&bridge, &entity, &action),
        Commands::Snapshot { command } => snapshot::execute(&bridge, command),
    }
}
