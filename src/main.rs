//! registro CLI entry point
//!
//! Minimal shell: parse arguments, dispatch to the CLI module, print
//! errors to stderr and exit non-zero on failure. Configuration loading,
//! store recovery and server startup all live behind cli::run.

use registro::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
