//! JSON snapshot encoding
//!
//! An array of client objects with the same fields as the CSV columns;
//! timestamps render as RFC 3339 strings via serde.

use crate::model::Client;

use super::errors::{ExportError, ExportResult};

/// Whole snapshot as one JSON document.
pub fn document(clients: &[Client]) -> ExportResult<String> {
    serde_json::to_string(clients).map_err(|e| ExportError::Json(e.to_string()))
}
