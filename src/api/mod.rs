//! HTTP config API.
//!
//! # Routes
//! ```text
//! GET  /config?sections=a,b   → sections as a JSON map
//! GET  /config/json           → sections as a JSON string
//! POST /config                → {"config": {...}, "dry_run": bool}
//! POST /config/json           → {"config": "<document>", "dry_run": bool}
//! POST /config/reload         → {"path": ..., "section": ..., "dry_run": bool}
//! POST /config/store          → {"sections": [...]}
//! ```
//!
//! # Design Decisions
//! - Every route requires `Authorization: Bearer <key>`
//! - Manager calls that may touch the disk run on the blocking pool

pub mod auth;
pub mod handlers;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::ConfigManager;
use crate::observability::metrics;

use self::auth::api_auth_middleware;
use self::handlers::*;

/// State shared by the API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub manager: Arc<ConfigManager>,
    pub api_key: Arc<str>,
}

impl ApiState {
    pub fn new(manager: Arc<ConfigManager>, api_key: impl Into<Arc<str>>) -> Self {
        Self {
            manager,
            api_key: api_key.into(),
        }
    }
}

pub fn setup_api_router(state: ApiState) -> Router {
    Router::new()
        .route("/config", get(get_config).post(set_config))
        .route("/config/json", get(get_config_as_json).post(set_config_from_json))
        .route("/config/reload", post(reload_config))
        .route("/config/store", post(store_config))
        .route_layer(middleware::from_fn_with_state(state.clone(), api_auth_middleware))
        .route_layer(middleware::from_fn(track_metrics))
        .with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_default();
    let response = next.run(request).await;
    metrics::record_api_request(route, response.status().as_u16(), start);
    response
}
