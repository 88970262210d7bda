//! Health endpoint

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`
    pub status: String,
    pub version: String,
    pub engine: EngineHealth,
}

#[derive(Debug, Serialize)]
pub struct EngineHealth {
    pub name: String,
    pub available: bool,
    /// Engine version, or why it cannot be used
    pub detail: String,
}

/// Reports whether the rendering engine found at startup is usable.
/// Answers 503 while degraded so load balancers can act on it.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let engine = state.engine.status();
    let available = engine.is_available();

    let (code, status) = if available {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            engine: EngineHealth {
                name: state.engine.name(),
                available,
                detail: engine.detail().to_string(),
            },
        }),
    )
}
