//! Materialized table state
//!
//! Current rows for the three logical tables, kept in memory and rebuilt
//! from the journal on open. Maps are keyed by id; ids are assigned
//! monotonically, so key order is insertion order. An exact-match email
//! index enforces correo_electronico uniqueness.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::model::{AuditEntry, Client, Consent};

use super::errors::{StoreError, StoreResult};
use super::journal::{JournalRecord, RecordType, Table};
use super::store::StagedWrite;

/// In-memory state of all three tables.
#[derive(Debug, Default)]
pub struct Tables {
    clients: BTreeMap<i64, Client>,
    consents: BTreeMap<i64, Consent>,
    audit: BTreeMap<i64, AuditEntry>,
    /// correo_electronico -> client id (exact match)
    email_index: HashMap<String, i64>,
    next_client_id: i64,
    next_consent_id: i64,
    next_audit_id: i64,
    /// Highest creation timestamp ever stored; the store clock never
    /// assigns below this
    latest_timestamp: Option<DateTime<Utc>>,
}

impl Tables {
    pub fn new() -> Self {
        Self {
            next_client_id: 1,
            next_consent_id: 1,
            next_audit_id: 1,
            ..Default::default()
        }
    }

    /// Rebuild table state from committed journal records.
    pub fn replay(records: &[JournalRecord]) -> StoreResult<Self> {
        let mut tables = Self::new();

        for record in records {
            match (record.record_type, record.table) {
                (RecordType::Insert | RecordType::Update, Table::Clientes) => {
                    let row: Client = decode_row(record)?;
                    tables.put_client(row);
                }
                (RecordType::Insert | RecordType::Update, Table::Consentimientos) => {
                    let row: Consent = decode_row(record)?;
                    tables.put_consent(row);
                }
                (RecordType::Insert | RecordType::Update, Table::Auditoria) => {
                    let row: AuditEntry = decode_row(record)?;
                    tables.put_audit(row);
                }
                (RecordType::Delete, Table::Clientes) => tables.remove_client(record.row_id),
                (RecordType::Delete, Table::Consentimientos) => {
                    tables.remove_consent(record.row_id)
                }
                (RecordType::Delete, Table::Auditoria) => tables.remove_audit(record.row_id),
                (RecordType::Commit, _) => {
                    return Err(StoreError::Corrupt(
                        "commit marker among committed operation records".to_string(),
                    ))
                }
            }
        }

        Ok(tables)
    }

    /// Apply one staged write from a committed transaction.
    pub fn apply(&mut self, write: StagedWrite) {
        match write {
            StagedWrite::InsertClient(row) | StagedWrite::UpdateClient(row) => {
                self.put_client(row)
            }
            StagedWrite::DeleteClient(id) => self.remove_client(id),
            StagedWrite::InsertConsent(row) => self.put_consent(row),
            StagedWrite::DeleteConsent(id) => self.remove_consent(id),
            StagedWrite::InsertAudit(row) => self.put_audit(row),
            StagedWrite::DeleteAudit(id) => self.remove_audit(id),
        }
    }

    fn put_client(&mut self, row: Client) {
        if let Some(previous) = self.clients.get(&row.id) {
            self.email_index.remove(&previous.correo_electronico);
        }
        self.email_index.insert(row.correo_electronico.clone(), row.id);
        self.next_client_id = self.next_client_id.max(row.id + 1);
        self.observe_timestamp(row.fecha_registro);
        self.clients.insert(row.id, row);
    }

    fn remove_client(&mut self, id: i64) {
        if let Some(previous) = self.clients.remove(&id) {
            self.email_index.remove(&previous.correo_electronico);
        }
    }

    fn put_consent(&mut self, row: Consent) {
        self.next_consent_id = self.next_consent_id.max(row.id + 1);
        self.observe_timestamp(row.fecha_consentimiento);
        self.consents.insert(row.id, row);
    }

    fn remove_consent(&mut self, id: i64) {
        self.consents.remove(&id);
    }

    fn put_audit(&mut self, row: AuditEntry) {
        self.next_audit_id = self.next_audit_id.max(row.id + 1);
        self.observe_timestamp(row.fecha);
        self.audit.insert(row.id, row);
    }

    fn remove_audit(&mut self, id: i64) {
        self.audit.remove(&id);
    }

    fn observe_timestamp(&mut self, ts: DateTime<Utc>) {
        if self.latest_timestamp.map_or(true, |latest| ts > latest) {
            self.latest_timestamp = Some(ts);
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn client(&self, id: i64) -> Option<&Client> {
        self.clients.get(&id)
    }

    /// Insertion-order page of clients.
    pub fn clients_page(&self, skip: usize, limit: usize) -> Vec<Client> {
        self.clients.values().skip(skip).take(limit).cloned().collect()
    }

    /// Every client, insertion order.
    pub fn all_clients(&self) -> Vec<Client> {
        self.clients.values().cloned().collect()
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// All consents of one client, insertion order.
    pub fn consents_for(&self, cliente_id: i64) -> Vec<Consent> {
        self.consents
            .values()
            .filter(|c| c.cliente_id == cliente_id)
            .cloned()
            .collect()
    }

    /// All audit entries of one client, insertion order.
    pub fn audit_for(&self, cliente_id: i64) -> Vec<AuditEntry> {
        self.audit
            .values()
            .filter(|a| a.cliente_id == cliente_id)
            .cloned()
            .collect()
    }

    /// Insertion-order page over the global audit trail.
    pub fn audit_page(&self, skip: usize, limit: usize) -> Vec<AuditEntry> {
        self.audit.values().skip(skip).take(limit).cloned().collect()
    }

    pub fn audit_count(&self) -> usize {
        self.audit.len()
    }

    pub fn consent_count(&self) -> usize {
        self.consents.len()
    }

    /// Which client, if any, owns this correo_electronico.
    pub fn email_owner(&self, correo: &str) -> Option<i64> {
        self.email_index.get(correo).copied()
    }

    pub fn next_client_id(&self) -> i64 {
        self.next_client_id
    }

    pub fn next_consent_id(&self) -> i64 {
        self.next_consent_id
    }

    pub fn next_audit_id(&self) -> i64 {
        self.next_audit_id
    }

    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.latest_timestamp
    }
}

fn decode_row<T: serde::de::DeserializeOwned>(record: &JournalRecord) -> StoreResult<T> {
    serde_json::from_slice(&record.payload).map_err(|e| {
        StoreError::Corrupt(format!(
            "undecodable {} row {}: {}",
            record.table.as_str(),
            record.row_id,
            e
        ))
    })
}
