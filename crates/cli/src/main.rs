use clap::Parser;
use simbridge_cli::{cli::Cli, commands, logging};
use tracing::error;

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(err) = commands::dispatch(cli) {
        error!(target = "simbridge", error = %err, "command failed");
        std::process::exit(1);
    }
}
