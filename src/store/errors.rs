//! Entity store error types

use thiserror::Error;

/// Store module result type
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the entity store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Referenced entity absent
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Unique-constraint violation on correo_electronico
    #[error("correo_electronico already registered: {0}")]
    DuplicateEmail(String),

    /// Journal record failed integrity checks
    #[error("journal corrupt: {0}")]
    Corrupt(String),

    /// Underlying storage failure
    #[error("journal I/O: {0}")]
    Io(#[from] std::io::Error),

    /// Invariant violation inside the store itself
    #[error("internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// A missing client row
    pub fn client_not_found(id: i64) -> Self {
        StoreError::NotFound {
            entity: "cliente",
            id,
        }
    }

    /// A missing consent row
    pub fn consent_not_found(id: i64) -> Self {
        StoreError::NotFound {
            entity: "consentimiento",
            id,
        }
    }

    /// A missing audit row
    pub fn audit_not_found(id: i64) -> Self {
        StoreError::NotFound {
            entity: "auditoria",
            id,
        }
    }

    /// True for the NotFound variant
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// True for the Conflict (duplicate email) variant
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::DuplicateEmail(_))
    }
}
