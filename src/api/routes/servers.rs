//! Target CRUD and probe endpoints

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde_json::Value;

use crate::{
    api::{
        error::{ApiError, ApiResult},
        state::ApiState,
        types::{LivenessResponse, ServersResponse},
    },
    prober::Metrics,
    registry::{TargetFields, check_not_null},
    storage::{Target, TargetId},
};

type IdPath = Result<Path<TargetId>, PathRejection>;
type FieldsBody = Result<Json<Value>, JsonRejection>;

/// Decode a create/update body, rejecting explicit nulls per field
fn target_fields(body: FieldsBody) -> ApiResult<TargetFields> {
    let Json(body) = body?;
    check_not_null(&body)?;

    serde_json::from_value(body).map_err(|e| {
        ApiError::InvalidRequest(format!("Failed to deserialize the JSON body: {e}"))
    })
}

/// GET /api/v1/servers
pub async fn list_servers(State(state): State<ApiState>) -> ApiResult<Json<ServersResponse>> {
    let servers = state.registry.list().await?;

    Ok(Json(ServersResponse {
        count: servers.len(),
        servers,
    }))
}

/// POST /api/v1/servers
pub async fn create_server(
    State(state): State<ApiState>,
    body: FieldsBody,
) -> ApiResult<(StatusCode, Json<Target>)> {
    let fields = target_fields(body)?;
    let target = state.registry.create(fields).await?;

    Ok((StatusCode::CREATED, Json(target)))
}

/// GET /api/v1/servers/:id
pub async fn get_server(
    State(state): State<ApiState>,
    path: IdPath,
) -> ApiResult<Json<Target>> {
    let Path(id) = path?;
    Ok(Json(state.registry.get(id).await?))
}

/// PUT /api/v1/servers/:id
///
/// Partial update: fields missing from the body keep their stored values
pub async fn update_server(
    State(state): State<ApiState>,
    path: IdPath,
    body: FieldsBody,
) -> ApiResult<Json<Target>> {
    let Path(id) = path?;
    let fields = target_fields(body)?;
    Ok(Json(state.registry.update(id, fields).await?))
}

/// DELETE /api/v1/servers/:id
pub async fn delete_server(
    State(state): State<ApiState>,
    path: IdPath,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    state.registry.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/servers/:id/ping
pub async fn ping_server(
    State(state): State<ApiState>,
    path: IdPath,
) -> ApiResult<Json<LivenessResponse>> {
    let Path(id) = path?;
    let target = state.registry.get(id).await?;
    let alive = state.prober.check_liveness(&target).await?;

    Ok(Json(LivenessResponse { alive }))
}

/// GET /api/v1/servers/:id/metrics
///
/// Snapshot of the target's `INFO` report
pub async fn get_server_metrics(
    State(state): State<ApiState>,
    path: IdPath,
) -> ApiResult<Json<Metrics>> {
    let Path(id) = path?;
    let target = state.registry.get(id).await?;
    Ok(Json(state.prober.get_metrics(&target).await?))
}
