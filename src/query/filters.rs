//! Search filters for client listings
//!
//! Case-insensitive substring match per field; provided fields are ANDed
//! together, absent fields impose no constraint.

use serde::Deserialize;

use crate::model::Client;

/// Filter over client fields, deserializable straight from query
/// parameters (`?nombre=&correo=&telefono=`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientFilter {
    pub nombre: Option<String>,
    pub correo: Option<String>,
    pub telefono: Option<String>,
}

impl ClientFilter {
    /// True when no field constrains the search.
    pub fn is_empty(&self) -> bool {
        self.nombre.is_none() && self.correo.is_none() && self.telefono.is_none()
    }

    /// Checks if a client matches all provided fields (AND semantics).
    pub fn matches(&self, client: &Client) -> bool {
        let checks = [
            (self.nombre.as_deref(), client.nombre.as_str()),
            (self.correo.as_deref(), client.correo_electronico.as_str()),
            (self.telefono.as_deref(), client.telefono.as_str()),
        ];

        checks.iter().all(|(needle, haystack)| match needle {
            Some(needle) => contains_ci(haystack, needle),
            None => true,
        })
    }
}

/// Case-insensitive substring match.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
