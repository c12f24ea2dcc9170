//! Export formatter error types

use thiserror::Error;

/// Export module result type
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors surfaced while producing a snapshot
#[derive(Debug, Error)]
pub enum ExportError {
    /// Format string outside {csv, json}
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// CSV encoding failure
    #[error("csv encoding: {0}")]
    Csv(String),

    /// JSON encoding failure
    #[error("json encoding: {0}")]
    Json(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_names_the_input() {
        let err = ExportError::UnsupportedFormat("xml".to_string());
        assert_eq!(err.to_string(), "unsupported export format: xml");
    }
}
