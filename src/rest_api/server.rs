//! # REST API HTTP Server
//!
//! Assembles the route modules into one Axum application and runs it.

use std::io;
use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ServiceConfig;
use crate::observability::Logger;
use crate::pipeline::MutationPipeline;
use crate::query::QueryService;
use crate::store::EntityStore;

use super::{audit, clients, consents};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: MutationPipeline,
    pub query: QueryService,
    pub store: Arc<EntityStore>,
}

impl AppState {
    /// Wire the service components around one opened store.
    pub fn new(store: Arc<EntityStore>, config: &ServiceConfig) -> Self {
        Self {
            pipeline: MutationPipeline::new(store.clone()),
            query: QueryService::new(store.clone(), config.max_page_size),
            store,
        }
    }
}

/// Build the combined router with all endpoints
pub fn build_router(state: AppState, config: &ServiceConfig) -> Router {
    // Configure CORS from config
    let cors = if config.cors_origins.is_empty() {
        // No origins configured: permissive, for development
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(clients::routes())
        .merge(consents::routes())
        .merge(audit::routes())
        .layer(cors)
        .with_state(state)
}

/// Welcome body at the root
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Bienvenido a la API de registro de clientes"
    }))
}

/// Liveness probe
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: ServiceConfig, state: AppState) -> io::Result<()> {
    let addr = config.socket_addr();
    let listener = TcpListener::bind(&addr).await?;

    Logger::info("SERVER_STARTED", &[("addr", addr.as_str())]);

    axum::serve(listener, build_router(state, &config)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_state_wires_components_around_one_store() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(EntityStore::open(temp.path()).unwrap());
        let config = ServiceConfig::default();

        let state = AppState::new(store.clone(), &config);
        let _router = build_router(state, &config);
    }
}
