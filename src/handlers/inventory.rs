use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::models::*;
use crate::AppState;

use super::{created, require_key, ApiError};

// ========== QoS Services ==========

pub async fn list_qos_services(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<QosService>>, ApiError> {
    Ok(Json(state.store.list_qos_services().await?))
}

pub async fn create_qos_service(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateQosServiceRequest>,
) -> Result<(StatusCode, Json<QosService>), ApiError> {
    require_key("id", &req.id)?;
    if req.policy_name.is_empty() {
        return Err(ApiError::bad_request("policy_name is required"));
    }
    Ok(created(state.store.upsert_qos_service(&req).await?))
}

pub async fn delete_qos_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_qos_service(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ========== Locations ==========

pub async fn list_locations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Location>>, ApiError> {
    Ok(Json(state.store.list_locations().await?))
}

pub async fn create_location(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateLocationRequest>,
) -> Result<(StatusCode, Json<Location>), ApiError> {
    require_key("device", &req.device)?;
    Ok(created(state.store.upsert_location(&req).await?))
}

pub async fn delete_location(
    State(state): State<Arc<AppState>>,
    Path(device): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_location(&device).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ========== ID Pools ==========

pub async fn list_id_pools(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<IdPool>>, ApiError> {
    Ok(Json(state.store.list_id_pools().await?))
}

pub async fn create_id_pool(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateIdPoolRequest>,
) -> Result<(StatusCode, Json<IdPool>), ApiError> {
    require_key("name", &req.name)?;
    if req.range_start < 0 || req.range_end < req.range_start {
        return Err(ApiError::bad_request("range_start must be >= 0 and <= range_end"));
    }
    if state.store.get_id_pool(&req.name).await?.is_some() {
        return Err(ApiError::conflict("id pool with this name already exists"));
    }
    Ok(created(state.store.create_id_pool(&req).await?))
}

pub async fn list_id_allocations(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<IdAllocation>>, ApiError> {
    if state.store.get_id_pool(&name).await?.is_none() {
        return Err(ApiError::not_found("id pool"));
    }
    Ok(Json(state.store.list_id_allocations(&name).await?))
}
