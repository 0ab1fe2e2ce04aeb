//! Health check endpoint

use crate::api::{state::ApiState, types::HealthResponse};
use axum::{Json, extract::State};
use tracing::warn;

/// GET /api/v1/health
///
/// Reports whether the target store is reachable
pub async fn health_check(State(state): State<ApiState>) -> Json<HealthResponse> {
    let status = match state.registry.health_check().await {
        Ok(()) => "ok",
        Err(e) => {
            warn!("storage health check failed: {e}");
            "degraded"
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
