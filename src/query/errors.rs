//! Query service error types

use thiserror::Error;

use crate::store::StoreError;

/// Query module result type
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors surfaced by read operations
#[derive(Debug, Error)]
pub enum QueryError {
    /// Underlying store error (NotFound passes through here)
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Requested page size above the configured cap
    #[error("limit {given} exceeds maximum {max}")]
    LimitExceeded { given: usize, max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_exceeded_message() {
        let err = QueryError::LimitExceeded { given: 900, max: 500 };
        assert_eq!(err.to_string(), "limit 900 exceeds maximum 500");
    }

    #[test]
    fn test_store_not_found_passes_through() {
        let err = QueryError::from(StoreError::client_not_found(5));
        assert_eq!(err.to_string(), "cliente 5 not found");
    }
}
