use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::models::*;
use crate::AppState;

use super::{created, require_key, ApiError};

/// List all managed devices
pub async fn list_devices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Device>>, ApiError> {
    let devices = state.store.list_devices().await?;
    Ok(Json(devices))
}

/// Get a single device by name
pub async fn get_device(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Device>, ApiError> {
    let device = state
        .store
        .get_device(&name)
        .await?
        .ok_or_else(|| ApiError::not_found("device"))?;
    Ok(Json(device))
}

/// Create or replace a device
pub async fn create_device(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDeviceRequest>,
) -> Result<(StatusCode, Json<Device>), ApiError> {
    require_key("name", &req.name)?;
    if req.address.is_empty() {
        return Err(ApiError::bad_request("address is required"));
    }
    let device = state.store.upsert_device(&req).await?;
    Ok(created(device))
}

/// Delete a device
pub async fn delete_device(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_device(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Configs rendered for a device by all service instances
pub async fn get_device_config(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<DeviceConfig>>, ApiError> {
    let configs = state.store.list_device_configs(&name).await?;
    Ok(Json(configs))
}

/// Port aliases previously learned from a device
pub async fn list_acl_mappings(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<DeviceAclMapping>>, ApiError> {
    let mappings = state.store.list_acl_mappings(&name).await?;
    Ok(Json(mappings))
}
