use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::models::*;
use crate::services::{self, l2vpn::L2vpnCallback};
use crate::AppState;

use super::{require_key, ApiError};

// ========== l2vpn ==========

pub async fn list_l2vpn(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<L2vpnService>>, ApiError> {
    let instances = state.store.list_service_instances(service_type::L2VPN).await?;
    Ok(Json(instances))
}

pub async fn get_l2vpn(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<L2vpnService>, ApiError> {
    let instance = state
        .store
        .get_service_instance(service_type::L2VPN, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("l2vpn service"))?;
    Ok(Json(instance))
}

/// Create or update an l2vpn service instance
pub async fn put_l2vpn(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(mut req): Json<L2vpnService>,
) -> Result<Json<ServiceApplyResponse<L2vpnService>>, ApiError> {
    require_key("service_id", &id)?;
    require_key("qos_service_id", &req.link.qos_service_id)?;
    req.service_id = id;
    let resp = services::apply(&L2vpnCallback, &state.service_context(), req).await?;
    Ok(Json(resp))
}

pub async fn delete_l2vpn(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    services::remove(&L2vpnCallback, &state.service_context(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ========== access-python ==========

pub async fn list_access(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AccessService>>, ApiError> {
    let instances = state.store.list_service_instances(service_type::ACCESS).await?;
    Ok(Json(instances))
}

pub async fn get_access(
    State(state): State<Arc<AppState>>,
    Path(customer): Path<String>,
) -> Result<Json<AccessService>, ApiError> {
    let instance = state
        .store
        .get_service_instance(service_type::ACCESS, &customer)
        .await?
        .ok_or_else(|| ApiError::not_found("access service"))?;
    Ok(Json(instance))
}

/// Create or update an access service instance
pub async fn put_access(
    State(state): State<Arc<AppState>>,
    Path(customer): Path<String>,
    Json(mut req): Json<AccessService>,
) -> Result<Json<ServiceApplyResponse<AccessService>>, ApiError> {
    require_key("customer", &customer)?;
    require_key("device", &req.device)?;
    req.customer = customer;
    // vlan is operational data owned by the service
    req.vlan = None;
    let resp = services::apply(&state.access, &state.service_context(), req).await?;
    Ok(Json(resp))
}

pub async fn delete_access(
    State(state): State<Arc<AppState>>,
    Path(customer): Path<String>,
) -> Result<StatusCode, ApiError> {
    services::remove(&state.access, &state.service_context(), &customer).await?;
    Ok(StatusCode::NO_CONTENT)
}
