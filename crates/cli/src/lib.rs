//! Command-line front-end for the device automation bridge.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod output;
