//! Health check handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health and GET /v1/healthcheck
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let catalog_healthy = state.catalog.health_check().await.unwrap_or(false);
    let storage_healthy = state.disk.health_check().await.unwrap_or(false);

    let status = if catalog_healthy && storage_healthy {
        "ok"
    } else {
        "degraded"
    };

    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        service: state.config.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        catalog: state.catalog.backend().to_string(),
        catalog_healthy,
        storage_healthy,
    }))
}
