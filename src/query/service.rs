//! Read-only query operations
//!
//! Pagination defaults mirror the HTTP surface (skip=0, limit=10); page
//! sizes above the configured cap are rejected rather than clamped.

use std::sync::Arc;

use serde::Deserialize;

use crate::model::{AuditEntry, Client, Consent};
use crate::store::EntityStore;

use super::errors::{QueryError, QueryResult};
use super::filters::ClientFilter;

/// Pagination window, deserializable straight from query parameters
/// (`?skip=&limit=`).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

/// Read-only access to the entity store.
#[derive(Clone)]
pub struct QueryService {
    store: Arc<EntityStore>,
    max_page_size: usize,
}

impl QueryService {
    pub fn new(store: Arc<EntityStore>, max_page_size: usize) -> Self {
        Self {
            store,
            max_page_size,
        }
    }

    fn check_page(&self, page: Page) -> QueryResult<Page> {
        if page.limit > self.max_page_size {
            return Err(QueryError::LimitExceeded {
                given: page.limit,
                max: self.max_page_size,
            });
        }
        Ok(page)
    }

    /// Insertion-order page of clients.
    pub fn list_clients(&self, page: Page) -> QueryResult<Vec<Client>> {
        let page = self.check_page(page)?;
        Ok(self.store.list_clients(page.skip, page.limit)?)
    }

    /// The client row, or NotFound.
    pub fn get_client(&self, id: i64) -> QueryResult<Client> {
        Ok(self.store.get_client(id)?)
    }

    /// Case-insensitive substring search; an empty result is valid.
    pub fn search(&self, filter: &ClientFilter) -> QueryResult<Vec<Client>> {
        let clients = self.store.all_clients()?;
        Ok(clients.into_iter().filter(|c| filter.matches(c)).collect())
    }

    /// All consents of one client, insertion order. An unknown client
    /// yields an empty listing, not an error.
    pub fn list_consents(&self, cliente_id: i64) -> QueryResult<Vec<Consent>> {
        Ok(self.store.consents_for(cliente_id)?)
    }

    /// All audit entries of one client, insertion order.
    pub fn list_audit(&self, cliente_id: i64) -> QueryResult<Vec<AuditEntry>> {
        Ok(self.store.audit_for(cliente_id)?)
    }

    /// Global audit trail page, across all clients.
    pub fn list_audit_paged(&self, page: Page) -> QueryResult<Vec<AuditEntry>> {
        let page = self.check_page(page)?;
        Ok(self.store.list_audit(page.skip, page.limit)?)
    }
}
