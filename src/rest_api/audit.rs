//! Audit trail routes
//!
//! - POST /auditoria/ - manual audit entry (no audit-of-audit)
//! - GET  /auditoria/ - global paginated trail
//! - GET  /clientes/:id/auditoria - a client's trail

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::model::{AuditDraft, AuditEntry};
use crate::query::Page;

use super::errors::{ApiError, ApiResult};
use super::server::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auditoria/", get(list_audit).post(create_audit))
        .route("/clientes/:id/auditoria", get(list_client_audit))
}

async fn create_audit(
    State(state): State<AppState>,
    Json(draft): Json<AuditDraft>,
) -> ApiResult<(StatusCode, Json<AuditEntry>)> {
    draft.validate().map_err(ApiError::InvalidArgument)?;
    let entry = state.pipeline.record_audit(draft.cliente_id, &draft.accion)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn list_audit(
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> ApiResult<Json<Vec<AuditEntry>>> {
    Ok(Json(state.query.list_audit_paged(page)?))
}

async fn list_client_audit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<AuditEntry>>> {
    Ok(Json(state.query.list_audit(id)?))
}
