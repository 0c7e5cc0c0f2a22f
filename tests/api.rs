mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use ocs_config::api::{setup_api_router, ApiState};
use ocs_config::config::{ChargingConfig, ConfigManager, ConfigStore, MemoryStore};
use serde_json::{json, Value};
use tower::ServiceExt;

const KEY: &str = "test-key";

fn app() -> (Router, Arc<ConfigManager>) {
    let manager = Arc::new(ConfigManager::new(ChargingConfig::default()));
    (setup_api_router(ApiState::new(manager.clone(), KEY)), manager)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {KEY}"))
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {KEY}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_requires_bearer_token() {
    let (app, _) = app();
    let request = Request::builder().uri("/config").body(Body::empty()).unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/config")
        .header(header::AUTHORIZATION, "Bearer wrong")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_config_sections() {
    let (app, _) = app();
    let (status, body) = send(&app, get("/config?sections=cores,general")).await;
    assert_eq!(status, StatusCode::OK);
    let sections = body.as_object().unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(body["cores"]["caps_strategy"], "*busy");

    let (status, body) = send(&app, get("/config/json?sections=cores")).await;
    assert_eq!(status, StatusCode::OK);
    let inner: Value = serde_json::from_str(body.as_str().unwrap()).unwrap();
    assert_eq!(inner["cores"]["caps"], 0);

    let (status, body) = send(&app, get("/config?sections=bogus")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid section <bogus>");
}

#[tokio::test]
async fn test_set_config_and_dry_run() {
    let (app, manager) = app();
    let (status, body) = send(
        &app,
        post("/config", json!({"config": {"cores": {"caps": 5}}, "dry_run": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("OK"));
    assert_eq!(manager.snapshot().cores.caps, 0);

    let (status, _) = send(&app, post("/config", json!({"config": {"cores": {"caps": 5}}}))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, get("/config?sections=cores")).await;
    assert_eq!(body["cores"]["caps"], 5);
}

#[tokio::test]
async fn test_set_config_from_json_rejects_insane_config() {
    let (app, manager) = app();
    let text = r#"{"sessions": {"enabled": true, "stats_conns": ["*internal"]}}"#;
    let (status, body) = send(&app, post("/config/json", json!({"config": text}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("<stats> not enabled but requested by <sessions> component"));
    assert!(!manager.snapshot().sessions.enabled);
}

#[tokio::test]
async fn test_reload_without_source() {
    let (app, _) = app();
    let (status, body) = send(&app, post("/config/reload", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "MANDATORY_IE_MISSING: [path]");
}

#[tokio::test]
async fn test_reload_from_path() {
    let (dir, path) = common::sample_dir();
    let (app, manager) = app();
    let (status, _) = send(
        &app,
        post("/config/reload", json!({"path": path, "section": "general"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(manager.snapshot().general.node_id, "ocs-1");
    drop(dir);
}

#[tokio::test]
async fn test_store_endpoint() {
    let (app, _) = app();
    let (status, _) = send(&app, post("/config/store", json!({"sections": ["general"]}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let store = Arc::new(MemoryStore::new());
    let manager = ConfigManager::new(ChargingConfig::default()).with_store(store.clone());
    let app = setup_api_router(ApiState::new(Arc::new(manager), KEY));
    let (status, _) = send(&app, post("/config", json!({"config": {"general": {"node_id": "api"}}}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        store.get_section("general").unwrap(),
        Some(json!({"node_id": "api"}))
    );
}
