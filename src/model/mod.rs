//! Persisted entities and the typed commands the boundary decodes into.
//!
//! Field names are the wire contract (`nombre`, `correo_electronico`, ...)
//! and double as the JSON keys, so the structs serialize directly into the
//! shapes the HTTP surface and the export formatter emit. `telefono` and
//! `correo_electronico` are plain UTF-8 strings end-to-end.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The primary business entity: one person/record per row.
///
/// `fecha_registro` is assigned by the store at creation and never
/// mutated. `activo` governs soft-delete: rows are marked inactive, never
/// removed, by the public API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub nombre: String,
    pub telefono: String,
    pub correo_electronico: String,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub fecha_registro: DateTime<Utc>,
    pub activo: bool,
}

/// An immutable record of a client's agreement to terms.
///
/// Append-only: no update or delete operation exists for consents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consent {
    pub id: i64,
    pub cliente_id: i64,
    pub acepta_terminos: bool,
    pub fecha_consentimiento: DateTime<Utc>,
}

/// An immutable log record of an action taken against a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub cliente_id: i64,
    pub accion: String,
    pub fecha: DateTime<Utc>,
}

/// Client fields as submitted by a caller, for both creation and full
/// update. An omitted `activo` means active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientDraft {
    pub nombre: String,
    pub telefono: String,
    pub correo_electronico: String,
    #[serde(default)]
    pub fecha_nacimiento: Option<NaiveDate>,
    #[serde(default = "default_activo")]
    pub activo: bool,
}

fn default_activo() -> bool {
    true
}

impl ClientDraft {
    /// Boundary-level validation: required string fields must be
    /// non-empty after trimming.
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("nombre", &self.nombre),
            ("telefono", &self.telefono),
            ("correo_electronico", &self.correo_electronico),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{} must not be empty", field));
            }
        }
        Ok(())
    }
}

/// Consent fields as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsentDraft {
    pub cliente_id: i64,
    pub acepta_terminos: bool,
}

/// Manual audit entry fields as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditDraft {
    pub cliente_id: i64,
    pub accion: String,
}

impl AuditDraft {
    /// The action description must say something.
    pub fn validate(&self) -> Result<(), String> {
        if self.accion.trim().is_empty() {
            return Err("accion must not be empty".to_string());
        }
        Ok(())
    }
}
