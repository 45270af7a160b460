//! Health check endpoints.
//!
//! - `/` - Service banner
//! - `/livez` - Liveness probe (immediate 200, no checks)
//! - `/readyz` - Readiness probe (round-trips the storage backend)

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use uuid::Uuid;

use crate::state::AppState;

/// GET / - Reports the service is up.
#[axum::debug_handler]
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({ "msg": "ok" }))
}

/// GET /livez - Basic liveness probe.
#[axum::debug_handler]
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /readyz - Returns 503 while storage cannot answer a lookup.
#[axum::debug_handler(state = AppState)]
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    match state.users.get_user(Uuid::nil()).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "ready": true }))),
        Err(e) => {
            tracing::error!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "ready": false })),
            )
        }
    }
}
