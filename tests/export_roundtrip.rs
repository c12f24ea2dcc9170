//! Export Round-Trip Tests
//!
//! CSV and JSON snapshots of the same store must agree on the
//! (id, nombre, correo_electronico) tuples, and unsupported formats are
//! rejected up front.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tempfile::TempDir;

use registro::export::{self, ExportFormat};
use registro::model::ClientDraft;
use registro::store::EntityStore;

fn populated_store(temp: &TempDir) -> EntityStore {
    let store = EntityStore::open(temp.path()).unwrap();
    let drafts = [
        ("Ana García", "ana@example.com", Some((1990, 4, 2))),
        ("Beto, el de ventas", "beto@example.com", None),
        ("Carla", "carla@example.com", Some((1985, 12, 31))),
    ];

    for (nombre, correo, nacimiento) in drafts {
        store
            .transaction(|txn| {
                txn.insert_client(&ClientDraft {
                    nombre: nombre.to_string(),
                    telefono: "5550000".to_string(),
                    correo_electronico: correo.to_string(),
                    fecha_nacimiento: nacimiento
                        .and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
                    activo: true,
                })
            })
            .unwrap();
    }
    store
}

/// Parse (id, nombre, correo_electronico) tuples back out of a CSV
/// document.
fn csv_tuples(doc: &str) -> BTreeSet<(i64, String, String)> {
    let mut reader = csv::Reader::from_reader(doc.as_bytes());
    reader
        .records()
        .map(|record| {
            let record = record.unwrap();
            (
                record[0].parse::<i64>().unwrap(),
                record[1].to_string(),
                record[3].to_string(),
            )
        })
        .collect()
}

fn json_tuples(doc: &str) -> BTreeSet<(i64, String, String)> {
    let parsed: serde_json::Value = serde_json::from_str(doc).unwrap();
    parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|obj| {
            (
                obj["id"].as_i64().unwrap(),
                obj["nombre"].as_str().unwrap().to_string(),
                obj["correo_electronico"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

/// Exporting then re-parsing CSV yields the same tuple set as the JSON
/// export.
#[test]
fn test_csv_and_json_agree() {
    let temp = TempDir::new().unwrap();
    let store = populated_store(&temp);
    let clients = store.all_clients().unwrap();

    let csv_doc = export::csv::document(clients.clone()).unwrap();
    let json_doc = export::json::document(&clients).unwrap();

    let from_csv = csv_tuples(&csv_doc);
    let from_json = json_tuples(&json_doc);

    assert_eq!(from_csv.len(), 3);
    assert_eq!(from_csv, from_json);
}

/// The CSV header row is the documented column order.
#[test]
fn test_csv_header() {
    let temp = TempDir::new().unwrap();
    let store = populated_store(&temp);

    let doc = export::csv::document(store.all_clients().unwrap()).unwrap();
    assert_eq!(
        doc.lines().next().unwrap(),
        "id,nombre,telefono,correo_electronico,fecha_nacimiento,fecha_registro,activo"
    );
}

/// A quoted name containing a comma survives the round trip intact.
#[test]
fn test_comma_in_name_roundtrips() {
    let temp = TempDir::new().unwrap();
    let store = populated_store(&temp);

    let doc = export::csv::document(store.all_clients().unwrap()).unwrap();
    let tuples = csv_tuples(&doc);
    assert!(tuples
        .iter()
        .any(|(_, nombre, _)| nombre == "Beto, el de ventas"));
}

/// Snapshot of an empty store: CSV is just the header, JSON is an empty
/// array.
#[test]
fn test_empty_store_snapshots() {
    let temp = TempDir::new().unwrap();
    let store = EntityStore::open(temp.path()).unwrap();
    let clients = store.all_clients().unwrap();

    let csv_doc = export::csv::document(clients.clone()).unwrap();
    assert_eq!(csv_doc.lines().count(), 1);

    assert_eq!(export::json::document(&clients).unwrap(), "[]");
}

/// Format strings outside {csv, json} are invalid arguments.
#[test]
fn test_unsupported_format_rejected() {
    assert!(ExportFormat::parse("xml").is_err());
    assert!(ExportFormat::parse("").is_err());
    assert!(ExportFormat::parse("csv ").is_err());
}
