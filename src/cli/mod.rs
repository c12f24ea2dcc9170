//! CLI module for registro
//!
//! Provides command-line interface for:
//! - init: create the data directory layout and a default config
//! - start: boot the store and enter the HTTP serving loop
//! - export: one-shot snapshot export to stdout

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{export, init, run, start};
pub use errors::{CliError, CliResult};
