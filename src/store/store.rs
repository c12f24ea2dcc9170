//! The entity store
//!
//! Durable persistence for clients, consents and the audit trail.
//! Writes happen inside transactions: staged in memory, journaled with a
//! commit marker and one fsync, then applied to the materialized tables.
//! A transaction whose closure fails stages nothing and touches nothing.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::model::{AuditEntry, Client, ClientDraft, Consent, ConsentDraft};

use super::errors::{StoreError, StoreResult};
use super::journal::{self, JournalWriter, RecordType, Table};
use super::tables::Tables;

/// One write staged inside a transaction, applied only on commit.
#[derive(Debug, Clone)]
pub enum StagedWrite {
    InsertClient(Client),
    UpdateClient(Client),
    DeleteClient(i64),
    InsertConsent(Consent),
    DeleteConsent(i64),
    InsertAudit(AuditEntry),
    DeleteAudit(i64),
}

impl StagedWrite {
    fn encode(&self) -> StoreResult<(RecordType, Table, i64, Vec<u8>)> {
        fn row_json<T: serde::Serialize>(row: &T) -> StoreResult<Vec<u8>> {
            serde_json::to_vec(row)
                .map_err(|e| StoreError::Internal(format!("row serialization: {}", e)))
        }

        Ok(match self {
            StagedWrite::InsertClient(row) => {
                (RecordType::Insert, Table::Clientes, row.id, row_json(row)?)
            }
            StagedWrite::UpdateClient(row) => {
                (RecordType::Update, Table::Clientes, row.id, row_json(row)?)
            }
            StagedWrite::DeleteClient(id) => (RecordType::Delete, Table::Clientes, *id, Vec::new()),
            StagedWrite::InsertConsent(row) => (
                RecordType::Insert,
                Table::Consentimientos,
                row.id,
                row_json(row)?,
            ),
            StagedWrite::DeleteConsent(id) => {
                (RecordType::Delete, Table::Consentimientos, *id, Vec::new())
            }
            StagedWrite::InsertAudit(row) => {
                (RecordType::Insert, Table::Auditoria, row.id, row_json(row)?)
            }
            StagedWrite::DeleteAudit(id) => (RecordType::Delete, Table::Auditoria, *id, Vec::new()),
        })
    }
}

/// A write transaction over the store.
///
/// Reads see committed state plus this transaction's own staged writes
/// (read-your-writes). Nothing becomes durable or visible to other
/// callers until the owning [`EntityStore::transaction`] call commits.
pub struct Transaction<'a> {
    tables: &'a Tables,
    staged: Vec<StagedWrite>,
    next_client_id: i64,
    next_consent_id: i64,
    next_audit_id: i64,
    now: DateTime<Utc>,
}

impl<'a> Transaction<'a> {
    fn new(tables: &'a Tables, now: DateTime<Utc>) -> Self {
        Self {
            next_client_id: tables.next_client_id(),
            next_consent_id: tables.next_consent_id(),
            next_audit_id: tables.next_audit_id(),
            tables,
            staged: Vec::new(),
            now,
        }
    }

    /// The timestamp every row created in this transaction carries.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// The client as this transaction sees it: staged writes shadow
    /// committed rows.
    pub fn client(&self, id: i64) -> Option<Client> {
        for write in self.staged.iter().rev() {
            match write {
                StagedWrite::InsertClient(row) | StagedWrite::UpdateClient(row)
                    if row.id == id =>
                {
                    return Some(row.clone())
                }
                StagedWrite::DeleteClient(deleted) if *deleted == id => return None,
                _ => {}
            }
        }
        self.tables.client(id).cloned()
    }

    fn require_client(&self, id: i64) -> StoreResult<Client> {
        self.client(id).ok_or_else(|| StoreError::client_not_found(id))
    }

    fn email_in_use(&self, correo: &str, exclude: Option<i64>) -> bool {
        // Staged writes shadow committed rows, newest first
        let mut shadowed = Vec::new();
        for write in self.staged.iter().rev() {
            match write {
                StagedWrite::InsertClient(row) | StagedWrite::UpdateClient(row) => {
                    if shadowed.contains(&row.id) {
                        continue;
                    }
                    shadowed.push(row.id);
                    if Some(row.id) != exclude && row.correo_electronico == correo {
                        return true;
                    }
                }
                StagedWrite::DeleteClient(id) => shadowed.push(*id),
                _ => {}
            }
        }

        match self.tables.email_owner(correo) {
            Some(owner) => Some(owner) != exclude && !shadowed.contains(&owner),
            None => false,
        }
    }

    /// Stage a new client row. Identity and fecha_registro are assigned
    /// here; correo_electronico uniqueness is checked against committed
    /// and staged state.
    pub fn insert_client(&mut self, draft: &ClientDraft) -> StoreResult<Client> {
        if self.email_in_use(&draft.correo_electronico, None) {
            return Err(StoreError::DuplicateEmail(draft.correo_electronico.clone()));
        }

        let row = Client {
            id: self.next_client_id,
            nombre: draft.nombre.clone(),
            telefono: draft.telefono.clone(),
            correo_electronico: draft.correo_electronico.clone(),
            fecha_nacimiento: draft.fecha_nacimiento,
            fecha_registro: self.now,
            activo: draft.activo,
        };
        self.next_client_id += 1;
        self.staged.push(StagedWrite::InsertClient(row.clone()));
        Ok(row)
    }

    /// Stage a full-field update. fecha_registro is immutable and
    /// preserved from the stored row.
    pub fn update_client(&mut self, id: i64, draft: &ClientDraft) -> StoreResult<Client> {
        let current = self.require_client(id)?;

        if self.email_in_use(&draft.correo_electronico, Some(id)) {
            return Err(StoreError::DuplicateEmail(draft.correo_electronico.clone()));
        }

        let row = Client {
            id,
            nombre: draft.nombre.clone(),
            telefono: draft.telefono.clone(),
            correo_electronico: draft.correo_electronico.clone(),
            fecha_nacimiento: draft.fecha_nacimiento,
            fecha_registro: current.fecha_registro,
            activo: draft.activo,
        };
        self.staged.push(StagedWrite::UpdateClient(row.clone()));
        Ok(row)
    }

    /// Stage a soft-delete (or restore). The row is kept.
    pub fn set_active(&mut self, id: i64, activo: bool) -> StoreResult<Client> {
        let mut row = self.require_client(id)?;
        row.activo = activo;
        self.staged.push(StagedWrite::UpdateClient(row.clone()));
        Ok(row)
    }

    /// Stage a physical delete with application-level cascade: the
    /// client's consents and audit entries go in the same transaction.
    pub fn delete_client(&mut self, id: i64) -> StoreResult<Client> {
        let row = self.require_client(id)?;

        // Staged child inserts for this client must not survive it
        self.staged.retain(|write| match write {
            StagedWrite::InsertConsent(c) => c.cliente_id != id,
            StagedWrite::InsertAudit(a) => a.cliente_id != id,
            StagedWrite::InsertClient(c) | StagedWrite::UpdateClient(c) => c.id != id,
            _ => true,
        });

        for consent in self.tables.consents_for(id) {
            self.staged.push(StagedWrite::DeleteConsent(consent.id));
        }
        for entry in self.tables.audit_for(id) {
            self.staged.push(StagedWrite::DeleteAudit(entry.id));
        }
        if self.tables.client(id).is_some() {
            self.staged.push(StagedWrite::DeleteClient(id));
        }
        Ok(row)
    }

    /// Stage a consent row for an existing client.
    pub fn insert_consent(&mut self, draft: &ConsentDraft) -> StoreResult<Consent> {
        self.require_client(draft.cliente_id)?;

        let row = Consent {
            id: self.next_consent_id,
            cliente_id: draft.cliente_id,
            acepta_terminos: draft.acepta_terminos,
            fecha_consentimiento: self.now,
        };
        self.next_consent_id += 1;
        self.staged.push(StagedWrite::InsertConsent(row.clone()));
        Ok(row)
    }

    /// Stage an audit entry for an existing client.
    pub fn insert_audit(&mut self, cliente_id: i64, accion: &str) -> StoreResult<AuditEntry> {
        self.require_client(cliente_id)?;

        let row = AuditEntry {
            id: self.next_audit_id,
            cliente_id,
            accion: accion.to_string(),
            fecha: self.now,
        };
        self.next_audit_id += 1;
        self.staged.push(StagedWrite::InsertAudit(row.clone()));
        Ok(row)
    }

    fn into_staged(self) -> Vec<StagedWrite> {
        self.staged
    }
}

struct Inner {
    tables: Tables,
    journal: JournalWriter,
    next_txn_id: u64,
    last_timestamp: DateTime<Utc>,
}

impl Inner {
    /// Store clock: wall time clamped to be non-decreasing across all
    /// assignments, so creation timestamps can never invert.
    fn clock(&self) -> DateTime<Utc> {
        let now = Utc::now();
        if now > self.last_timestamp {
            now
        } else {
            self.last_timestamp
        }
    }
}

/// Durable, transactional entity store with explicit lifecycle: opened
/// from a data directory at startup, closed on drop.
pub struct EntityStore {
    inner: Mutex<Inner>,
}

impl EntityStore {
    /// Open (or create) the store under `data_dir`, replaying the
    /// journal into memory. A torn journal tail is truncated away.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let recovered = journal::recover(data_dir)?;
        let tables = Tables::replay(&recovered.committed)?;
        let journal = JournalWriter::open(data_dir, recovered.next_sequence, recovered.valid_len)?;

        let last_timestamp = tables.latest_timestamp().unwrap_or(DateTime::UNIX_EPOCH);

        Ok(Self {
            inner: Mutex::new(Inner {
                tables,
                journal,
                next_txn_id: recovered.last_txn_id + 1,
                last_timestamp,
            }),
        })
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Internal("store mutex poisoned".to_string()))
    }

    /// Run a write transaction: every staged write commits atomically or
    /// none does. Concurrent transactions serialize on the store lock.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&mut Transaction<'_>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;

        let now = inner.clock();
        let (out, staged) = {
            let mut txn = Transaction::new(&inner.tables, now);
            let out = f(&mut txn)?;
            (out, txn.into_staged())
        };

        if staged.is_empty() {
            return Ok(out);
        }

        let ops = staged
            .iter()
            .map(StagedWrite::encode)
            .collect::<StoreResult<Vec<_>>>()?;

        let txn_id = inner.next_txn_id;
        inner.journal.append_txn(txn_id, &ops)?;

        // Durable from here on; make it visible
        inner.next_txn_id += 1;
        inner.last_timestamp = now;
        for write in staged {
            inner.tables.apply(write);
        }

        Ok(out)
    }

    // ── Snapshot reads ───────────────────────────────────────────────

    /// The client row, or NotFound.
    pub fn get_client(&self, id: i64) -> StoreResult<Client> {
        let guard = self.lock()?;
        guard
            .tables
            .client(id)
            .cloned()
            .ok_or_else(|| StoreError::client_not_found(id))
    }

    /// Insertion-order page of clients.
    pub fn list_clients(&self, skip: usize, limit: usize) -> StoreResult<Vec<Client>> {
        Ok(self.lock()?.tables.clients_page(skip, limit))
    }

    /// Every client, insertion order (export snapshot).
    pub fn all_clients(&self) -> StoreResult<Vec<Client>> {
        Ok(self.lock()?.tables.all_clients())
    }

    /// All consents of one client, insertion order.
    pub fn consents_for(&self, cliente_id: i64) -> StoreResult<Vec<Consent>> {
        Ok(self.lock()?.tables.consents_for(cliente_id))
    }

    /// All audit entries of one client, insertion order.
    pub fn audit_for(&self, cliente_id: i64) -> StoreResult<Vec<AuditEntry>> {
        Ok(self.lock()?.tables.audit_for(cliente_id))
    }

    /// Insertion-order page over the global audit trail.
    pub fn list_audit(&self, skip: usize, limit: usize) -> StoreResult<Vec<AuditEntry>> {
        Ok(self.lock()?.tables.audit_page(skip, limit))
    }

    /// Row counts (clientes, consentimientos, auditoria).
    pub fn counts(&self) -> StoreResult<(usize, usize, usize)> {
        let guard = self.lock()?;
        Ok((
            guard.tables.client_count(),
            guard.tables.consent_count(),
            guard.tables.audit_count(),
        ))
    }
}
