//! CLI-specific error types
//!
//! Every CLI error is fatal: main prints it and exits non-zero.

use thiserror::Error;

use crate::config::ConfigError;
use crate::export::ExportError;
use crate::store::StoreError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file error
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// Store open/recovery failure
    #[error("store: {0}")]
    Store(#[from] StoreError),

    /// Snapshot export failure
    #[error("export: {0}")]
    Export(#[from] ExportError),

    /// I/O error (data directory, stdout, server socket)
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
