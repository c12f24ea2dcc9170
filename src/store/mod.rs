//! Entity store
//!
//! Durable persistence of Client/Consent/AuditEntry with referential
//! integrity. State lives in an append-only, checksummed transaction
//! journal; current rows are materialized in memory on open.

pub mod errors;
pub mod journal;
pub mod store;
pub mod tables;

pub use errors::{StoreError, StoreResult};
pub use journal::{JournalRecord, RecordType, Table};
pub use store::{EntityStore, Transaction};
