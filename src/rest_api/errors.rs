//! # REST API Errors
//!
//! Maps the service error taxonomy to transport status codes:
//! NotFound→404, Conflict→409, InvalidArgument→400, Internal→500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::export::ExportError;
use crate::query::QueryError;
use crate::store::StoreError;

/// Result type for REST handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// REST API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Referenced entity absent
    #[error("{0}")]
    NotFound(String),

    /// Unique-constraint violation
    #[error("{0}")]
    Conflict(String),

    /// Malformed input, unsupported export format, over-cap limit
    #[error("{0}")]
    InvalidArgument(String),

    /// Storage or transport failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            StoreError::DuplicateEmail(_) => ApiError::Conflict(err.to_string()),
            StoreError::Corrupt(_) | StoreError::Io(_) | StoreError::Internal(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Store(inner) => ApiError::from(inner),
            QueryError::LimitExceeded { .. } => ApiError::InvalidArgument(err.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::UnsupportedFormat(_) => ApiError::InvalidArgument(err.to_string()),
            ExportError::Csv(_) | ExportError::Json(_) => ApiError::Internal(err.to_string()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(&self));
        (status, body).into_response()
    }
}
