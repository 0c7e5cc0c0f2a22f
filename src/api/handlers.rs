use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::api::ApiState;
use crate::config::{ConfigError, ConfigManager, ReloadArgs};

const OK: &str = "OK";

/// Comma separated section list; absent means every section.
#[derive(Debug, Default, Deserialize)]
pub struct SectionsQuery {
    pub sections: Option<String>,
}

impl SectionsQuery {
    fn names(&self) -> Vec<String> {
        self.sections
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct SetConfigRequest {
    pub config: Map<String, Value>,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetConfigFromJsonRequest {
    pub config: String,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct StoreRequest {
    #[serde(default)]
    pub sections: Vec<String>,
}

/// Error reply of the config API.
#[derive(Debug)]
pub enum ApiError {
    Config(ConfigError),
    Internal(String),
}

impl From<ConfigError> for ApiError {
    fn from(e: ConfigError) -> Self {
        ApiError::Config(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Config(ConfigError::Store(_)) | ApiError::Config(ConfigError::Watch(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Config(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Config(e) => e.to_string(),
            ApiError::Internal(msg) => msg.clone(),
        };
        if status.is_server_error() {
            tracing::error!(error = %message, "Config API request failed");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Run a manager call that may touch the disk on the blocking pool.
async fn blocking<T, F>(state: &ApiState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&ConfigManager) -> Result<T, ConfigError> + Send + 'static,
{
    let manager = state.manager.clone();
    tokio::task::spawn_blocking(move || f(&*manager))
        .await
        .map_err(|e| ApiError::Internal(format!("config task failed: {e}")))?
        .map_err(ApiError::from)
}

pub async fn get_config(
    State(state): State<ApiState>,
    Query(query): Query<SectionsQuery>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    Ok(Json(state.manager.get_config(&query.names())?))
}

pub async fn get_config_as_json(
    State(state): State<ApiState>,
    Query(query): Query<SectionsQuery>,
) -> Result<Json<String>, ApiError> {
    Ok(Json(state.manager.get_config_as_json(&query.names())?))
}

pub async fn set_config(
    State(state): State<ApiState>,
    Json(req): Json<SetConfigRequest>,
) -> Result<Json<&'static str>, ApiError> {
    blocking(&state, move |m| m.set_config(&req.config, req.dry_run)).await?;
    Ok(Json(OK))
}

pub async fn set_config_from_json(
    State(state): State<ApiState>,
    Json(req): Json<SetConfigFromJsonRequest>,
) -> Result<Json<&'static str>, ApiError> {
    blocking(&state, move |m| m.set_config_from_json(&req.config, req.dry_run)).await?;
    Ok(Json(OK))
}

pub async fn reload_config(
    State(state): State<ApiState>,
    Json(args): Json<ReloadArgs>,
) -> Result<Json<&'static str>, ApiError> {
    blocking(&state, move |m| m.reload(&args)).await?;
    Ok(Json(OK))
}

pub async fn store_config(
    State(state): State<ApiState>,
    Json(req): Json<StoreRequest>,
) -> Result<Json<&'static str>, ApiError> {
    blocking(&state, move |m| m.store_in_db(&req.sections)).await?;
    Ok(Json(OK))
}
