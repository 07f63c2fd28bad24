//! Health check endpoint.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub postgres: bool,
}

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "A dependency is unhealthy", body = HealthResponse)
    )
)]
pub async fn healthz(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    match state.db.health_check().await {
        Ok(status) if status.healthy => {
            (StatusCode::OK, Json(HealthResponse { status: "healthy".into(), postgres: true }))
        }
        _ => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse { status: "unhealthy".into(), postgres: false }),
        ),
    }
}
