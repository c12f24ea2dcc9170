//! CSV snapshot encoding
//!
//! One encoded chunk per row (header first), so the HTTP boundary can
//! stream a large snapshot without buffering the whole document.

use crate::model::Client;

use super::errors::{ExportError, ExportResult};

/// Column order of the snapshot, also the header row.
pub const HEADER: [&str; 7] = [
    "id",
    "nombre",
    "telefono",
    "correo_electronico",
    "fecha_nacimiento",
    "fecha_registro",
    "activo",
];

/// Encode one record (with proper quoting) into its own byte chunk.
fn encode_record<S: AsRef<[u8]>>(fields: &[S]) -> ExportResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer
        .write_record(fields)
        .map_err(|e| ExportError::Csv(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.to_string()))
}

fn client_fields(client: &Client) -> [String; 7] {
    [
        client.id.to_string(),
        client.nombre.clone(),
        client.telefono.clone(),
        client.correo_electronico.clone(),
        client
            .fecha_nacimiento
            .map(|d| d.to_string())
            .unwrap_or_default(),
        client.fecha_registro.format("%Y-%m-%d %H:%M:%S").to_string(),
        client.activo.to_string(),
    ]
}

/// Row-chunk iterator over a client snapshot: the header row, then one
/// chunk per client.
pub fn chunks(clients: Vec<Client>) -> impl Iterator<Item = ExportResult<Vec<u8>>> {
    std::iter::once(encode_record(&HEADER))
        .chain(clients.into_iter().map(|c| encode_record(&client_fields(&c))))
}

/// Whole snapshot as one CSV document (CLI export path).
pub fn document(clients: Vec<Client>) -> ExportResult<String> {
    let mut out = Vec::new();
    for chunk in chunks(clients) {
        out.extend_from_slice(&chunk?);
    }
    String::from_utf8(out).map_err(|e| ExportError::Csv(e.to_string()))
}
