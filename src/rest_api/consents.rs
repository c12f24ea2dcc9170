//! Consent routes
//!
//! - POST /consentimientos/ - append a consent (audited)
//! - GET  /clientes/:id/consentimientos - a client's consents

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::model::{Consent, ConsentDraft};

use super::errors::ApiResult;
use super::server::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/consentimientos/", post(create_consent))
        .route("/clientes/:id/consentimientos", get(list_client_consents))
}

async fn create_consent(
    State(state): State<AppState>,
    Json(draft): Json<ConsentDraft>,
) -> ApiResult<(StatusCode, Json<Consent>)> {
    let consent = state.pipeline.record_consent(&draft)?;
    Ok((StatusCode::CREATED, Json(consent)))
}

async fn list_client_consents(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<Consent>>> {
    Ok(Json(state.query.list_consents(id)?))
}
