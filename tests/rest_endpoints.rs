//! REST Endpoint Tests
//!
//! Exercises the HTTP surface end to end against a real store in a
//! temporary directory: status codes, bodies, error taxonomy mapping.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use registro::config::ServiceConfig;
use registro::rest_api::{build_router, AppState};
use registro::store::EntityStore;

fn app(temp: &TempDir) -> Router {
    let config = ServiceConfig {
        data_dir: temp.path().to_path_buf(),
        ..Default::default()
    };
    let store = Arc::new(EntityStore::open(temp.path()).unwrap());
    build_router(AppState::new(store, &config), &config)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn cliente_body(nombre: &str, correo: &str) -> serde_json::Value {
    serde_json::json!({
        "nombre": nombre,
        "telefono": "5550000",
        "correo_electronico": correo,
    })
}

async fn create_cliente(app: &Router, nombre: &str, correo: &str) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/clientes/", cliente_body(nombre, correo)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn test_create_returns_201_with_assigned_fields() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    let created = create_cliente(&app, "Ana", "ana@example.com").await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["activo"], true);
    assert!(created["fecha_registro"].is_string());
}

#[tokio::test]
async fn test_duplicate_email_maps_to_409() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    create_cliente(&app, "Ana", "ana@example.com").await;
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/clientes/",
            cliente_body("Impostora", "ana@example.com"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], 409);
}

#[tokio::test]
async fn test_blank_required_field_maps_to_400() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/clientes/", cliente_body("  ", "x@example.com")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_unknown_client_maps_to_404() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    let response = app.clone().oneshot(get_request("/clientes/99")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_pagination_window() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    create_cliente(&app, "C1", "c1@example.com").await;
    create_cliente(&app, "C2", "c2@example.com").await;
    create_cliente(&app, "C3", "c3@example.com").await;

    let response = app
        .clone()
        .oneshot(get_request("/clientes/?skip=1&limit=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["nombre"], "C2");
}

#[tokio::test]
async fn test_limit_above_cap_maps_to_400() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    let response = app
        .clone()
        .oneshot(get_request("/clientes/?limit=100000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_put_updates_and_preserves_registration() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    let created = create_cliente(&app, "Ana", "ana@example.com").await;
    let registro_original = created["fecha_registro"].clone();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/clientes/1",
            cliente_body("Ana García", "ana@example.com"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = body_json(response).await;
    assert_eq!(updated["nombre"], "Ana García");
    assert_eq!(updated["fecha_registro"], registro_original);
}

#[tokio::test]
async fn test_delete_is_logical() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    create_cliente(&app, "Ana", "ana@example.com").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/clientes/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["activo"], false);

    // Row retained
    let response = app.clone().oneshot(get_request("/clientes/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["activo"], false);
}

#[tokio::test]
async fn test_search_is_case_insensitive_and_anded() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    create_cliente(&app, "Ana García", "ana@example.com").await;
    create_cliente(&app, "maria ANA", "maria@example.com").await;
    create_cliente(&app, "Beto", "beto@example.com").await;

    let response = app
        .clone()
        .oneshot(get_request("/clientes/buscar?nombre=ana"))
        .await
        .unwrap();
    let hits = body_json(response).await;
    assert_eq!(hits.as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(get_request("/clientes/buscar?nombre=ana&correo=maria"))
        .await
        .unwrap();
    let hits = body_json(response).await;
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["nombre"], "maria ANA");

    // No constraint: everything comes back
    let response = app
        .clone()
        .oneshot(get_request("/clientes/buscar"))
        .await
        .unwrap();
    let hits = body_json(response).await;
    assert_eq!(hits.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_export_csv_streams_attachment() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    create_cliente(&app, "Ana", "ana@example.com").await;

    let response = app
        .clone()
        .oneshot(get_request("/clientes/export?format=csv"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=clientes.csv"
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let doc = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(doc.starts_with("id,nombre,telefono"));
    assert!(doc.contains("ana@example.com"));
}

#[tokio::test]
async fn test_export_unknown_format_maps_to_400() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    let response = app
        .clone()
        .oneshot(get_request("/clientes/export?format=xml"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_consent_endpoints() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    create_cliente(&app, "Ana", "ana@example.com").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/consentimientos/",
            serde_json::json!({ "cliente_id": 1, "acepta_terminos": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let consent = body_json(response).await;
    assert_eq!(consent["cliente_id"], 1);
    assert_eq!(consent["acepta_terminos"], true);

    let response = app
        .clone()
        .oneshot(get_request("/clientes/1/consentimientos"))
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // Unknown client: consent refused with 404
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/consentimientos/",
            serde_json::json!({ "cliente_id": 42, "acepta_terminos": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_audit_endpoints() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    create_cliente(&app, "Ana", "ana@example.com").await;

    // Creation already audited once; add a manual entry
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auditoria/",
            serde_json::json!({ "cliente_id": 1, "accion": "Revisión manual" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get_request("/clientes/1/auditoria"))
        .await
        .unwrap();
    let trail = body_json(response).await;
    assert_eq!(trail.as_array().unwrap().len(), 2);
    assert_eq!(trail[0]["accion"], "Cliente creado");
    assert_eq!(trail[1]["accion"], "Revisión manual");

    // Global trail pagination
    let response = app
        .clone()
        .oneshot(get_request("/auditoria/?skip=1&limit=1"))
        .await
        .unwrap();
    let page = body_json(response).await;
    assert_eq!(page.as_array().unwrap().len(), 1);
    assert_eq!(page[0]["accion"], "Revisión manual");
}

#[tokio::test]
async fn test_root_and_health() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    let response = app.clone().oneshot(get_request("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["message"].is_string());

    let response = app.clone().oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
