use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::models::*;
use crate::parsers::{self, PortTable};
use crate::services::acl_alias_mapping;
use crate::AppState;

use super::ApiError;

/// acl-alias-mapping action on a device
pub async fn acl_alias_mapping(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<AclAliasMappingResponse>, ApiError> {
    let resp = acl_alias_mapping::run(
        &state.store,
        state.runner.as_ref(),
        &state.config.acl_alias_command,
        &name,
    )
    .await?;
    Ok(Json(resp))
}

/// Offline extraction of a port table from posted command output
pub async fn extract(body: String) -> Json<PortTable> {
    Json(parsers::extract(&body))
}
