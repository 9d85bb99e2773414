//! JSON output helpers.
//!
//! Every command prints exactly one wire-shape JSON object on stdout;
//! diagnostics go to stderr through the logging layer.

use std::io::{self, Write};

use anyhow::Result;
use serde::Serialize;

/// Prints a wire-shape value as one JSON line on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, value)?;
    stdout.write_all(b"\n")?;
    Ok(())
}
