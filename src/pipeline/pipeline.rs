//! Audit-guarded mutations
//!
//! Every state-changing operation on a client runs here: the business
//! write and its audit entry are staged in one store transaction, so a
//! failure at any point rolls the whole unit back. No partial audit
//! gaps, no orphan mutations. Target-existence checks happen before any
//! write is staged.

use std::sync::Arc;

use uuid::Uuid;

use crate::model::{AuditEntry, Client, ClientDraft, Consent, ConsentDraft};
use crate::observability::Logger;
use crate::store::{EntityStore, StoreResult};

/// Audit labels, verbatim from the service's vocabulary.
pub const ACCION_CLIENTE_CREADO: &str = "Cliente creado";
pub const ACCION_CLIENTE_ACTUALIZADO: &str = "Cliente actualizado";
pub const ACCION_CLIENTE_ELIMINADO: &str = "Cliente eliminado (borrado lógico)";
pub const ACCION_CONSENTIMIENTO_REGISTRADO: &str = "Consentimiento registrado";

/// Guarded write operations over the entity store.
#[derive(Clone)]
pub struct MutationPipeline {
    store: Arc<EntityStore>,
}

impl MutationPipeline {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    /// Create a client and its "Cliente creado" audit entry.
    pub fn create_client(&self, draft: &ClientDraft) -> StoreResult<Client> {
        let client = self.store.transaction(|txn| {
            let client = txn.insert_client(draft)?;
            txn.insert_audit(client.id, ACCION_CLIENTE_CREADO)?;
            Ok(client)
        })?;

        log_committed("CLIENT_CREATED", client.id, ACCION_CLIENTE_CREADO);
        Ok(client)
    }

    /// Replace a client's fields and audit "Cliente actualizado".
    ///
    /// Fails with NotFound before any write when the id is absent.
    pub fn update_client(&self, id: i64, draft: &ClientDraft) -> StoreResult<Client> {
        let client = self.store.transaction(|txn| {
            let client = txn.update_client(id, draft)?;
            txn.insert_audit(id, ACCION_CLIENTE_ACTUALIZADO)?;
            Ok(client)
        })?;

        log_committed("CLIENT_UPDATED", id, ACCION_CLIENTE_ACTUALIZADO);
        Ok(client)
    }

    /// Soft-delete: mark the client inactive, keep the row, audit
    /// "Cliente eliminado (borrado lógico)".
    pub fn deactivate_client(&self, id: i64) -> StoreResult<Client> {
        let client = self.store.transaction(|txn| {
            let client = txn.set_active(id, false)?;
            txn.insert_audit(id, ACCION_CLIENTE_ELIMINADO)?;
            Ok(client)
        })?;

        log_committed("CLIENT_DEACTIVATED", id, ACCION_CLIENTE_ELIMINADO);
        Ok(client)
    }

    /// Append a consent for an existing client and audit
    /// "Consentimiento registrado".
    pub fn record_consent(&self, draft: &ConsentDraft) -> StoreResult<Consent> {
        let consent = self.store.transaction(|txn| {
            let consent = txn.insert_consent(draft)?;
            txn.insert_audit(consent.cliente_id, ACCION_CONSENTIMIENTO_REGISTRADO)?;
            Ok(consent)
        })?;

        log_committed(
            "CONSENT_RECORDED",
            consent.cliente_id,
            ACCION_CONSENTIMIENTO_REGISTRADO,
        );
        Ok(consent)
    }

    /// Append a manual audit entry. This bypasses the guard: the FK is
    /// validated and exactly one row is written - no audit-of-audit.
    pub fn record_audit(&self, cliente_id: i64, accion: &str) -> StoreResult<AuditEntry> {
        let entry = self
            .store
            .transaction(|txn| txn.insert_audit(cliente_id, accion))?;

        log_committed("AUDIT_RECORDED", cliente_id, accion);
        Ok(entry)
    }
}

/// One log line per committed unit, with a correlation id.
fn log_committed(event: &str, cliente_id: i64, accion: &str) {
    let op_id = Uuid::new_v4().to_string();
    let cliente_id = cliente_id.to_string();
    Logger::info(
        event,
        &[
            ("op_id", op_id.as_str()),
            ("cliente_id", cliente_id.as_str()),
            ("accion", accion),
        ],
    );
}
