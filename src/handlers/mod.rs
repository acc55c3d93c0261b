pub mod actions;
pub mod devices;
pub mod inventory;
pub mod services;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::services::acl_alias_mapping::DeviceCommandError;

/// Error response body: {"error": "message"}
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// API error type
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn not_found(resource: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("{} not found", resource),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: msg.into(),
        }
    }

    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!("{}: {}", self.status, self.message);
        }
        (
            self.status,
            Json(ErrorResponse::new(self.message)),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        // Check for typed NotFoundError first (no fragile string matching)
        if let Some(nf) = err.downcast_ref::<crate::db::NotFoundError>() {
            return Self::not_found(&format!("{} {}", nf.resource, nf.id));
        }
        if err.downcast_ref::<DeviceCommandError>().is_some() {
            return Self::bad_gateway(format!("{:#}", err));
        }
        Self::internal(format!("{:#}", err))
    }
}

/// Reject path keys and body keys that could not have come from a well-formed request
pub fn require_key(field: &str, value: &str) -> Result<(), ApiError> {
    if crate::utils::is_valid_key(value) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!("invalid {}: {:?}", field, value)))
    }
}

/// Response helper: return 201 Created with JSON body
pub fn created<T: Serialize>(item: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(item))
}

/// Healthcheck endpoint — returns 200 OK with status
pub async fn healthcheck() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "service-packs",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NotFoundError;

    #[test]
    fn test_error_status_mapping() {
        let err = ApiError::from(anyhow::Error::new(NotFoundError::new("Device", "ce0")));
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err = ApiError::from(anyhow::Error::new(DeviceCommandError {
            device: "ce0".into(),
            message: "timed out".into(),
        }));
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert!(err.message.contains("timed out"));

        let err = ApiError::from(anyhow::anyhow!("database is locked"));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_require_key() {
        assert!(require_key("name", "ce0").is_ok());
        assert_eq!(require_key("name", "bad name").unwrap_err().status, StatusCode::BAD_REQUEST);
    }
}
