//! CLI argument definitions using clap
//!
//! Commands:
//! - registro init --config <path>
//! - registro start --config <path>
//! - registro export --config <path> --format <csv|json>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// registro - an audit-consistent client record service
#[derive(Parser, Debug)]
#[command(name = "registro")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize the data directory and write a default config
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./registro.json")]
        config: PathBuf,
    },

    /// Start the HTTP server
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./registro.json")]
        config: PathBuf,
    },

    /// Export the client snapshot to stdout and exit
    Export {
        /// Path to configuration file
        #[arg(long, default_value = "./registro.json")]
        config: PathBuf,

        /// Snapshot format: csv or json
        #[arg(long, default_value = "json")]
        format: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
