//! CLI command implementations
//!
//! Boot sequence is owned here, not in main: load config, open the
//! store (journal recovery happens inside), then hand off to the
//! serving loop or the one-shot command.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::export::{self, ExportFormat};
use crate::observability::Logger;
use crate::rest_api::{self, AppState};
use crate::store::EntityStore;

use super::args::{Cli, Command};
use super::errors::CliResult;

/// Parse arguments and dispatch to the selected command.
pub fn run() -> CliResult<()> {
    match Cli::parse_args().command {
        Command::Init { config } => init(&config),
        Command::Start { config } => start(&config),
        Command::Export { config, format } => export(&config, &format),
    }
}

/// Create the data directory layout; write a default config file when
/// none exists yet. Idempotent.
pub fn init(config_path: &Path) -> CliResult<()> {
    if !config_path.exists() {
        let default = serde_json::to_string_pretty(&ServiceConfig::default())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(config_path, default)?;
        println!("wrote default config to {}", config_path.display());
    }

    let config = ServiceConfig::load(config_path)?;
    fs::create_dir_all(config.data_dir.join("journal"))?;
    println!("initialized data directory {}", config.data_dir.display());
    Ok(())
}

/// Boot the store and serve HTTP until stopped.
pub fn start(config_path: &Path) -> CliResult<()> {
    let config = ServiceConfig::load_or_default(config_path)?;
    let store = Arc::new(EntityStore::open(&config.data_dir)?);
    let state = AppState::new(store, &config);

    Logger::info(
        "STORE_OPENED",
        &[("data_dir", &config.data_dir.display().to_string())],
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(rest_api::serve(config, state))?;
    Ok(())
}

/// One-shot snapshot export to stdout.
pub fn export(config_path: &Path, format: &str) -> CliResult<()> {
    let format = ExportFormat::parse(format)?;
    let config = ServiceConfig::load_or_default(config_path)?;
    let store = EntityStore::open(&config.data_dir)?;
    let clients = store.all_clients()?;

    let document = match format {
        ExportFormat::Csv => export::csv::document(clients)?,
        ExportFormat::Json => export::json::document(&clients)?,
    };

    let mut stdout = std::io::stdout();
    stdout.write_all(document.as_bytes())?;
    if !document.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    Ok(())
}
