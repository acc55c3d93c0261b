use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Device represents a managed network element reachable over SSH
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    pub address: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_user: Option<String>,
    #[serde(skip_serializing)]
    pub ssh_pass: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// CreateDeviceRequest for creating or replacing devices
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDeviceRequest {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub ssh_user: Option<String>,
    #[serde(default)]
    pub ssh_pass: Option<String>,
}

/// RenderedConfig is one template expansion targeting one device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedConfig {
    pub device: String,
    pub template: String,
    pub config: String,
}

/// DeviceConfig is a stored RenderedConfig with its owning service instance
#[derive(Debug, Clone, Serialize)]
pub struct DeviceConfig {
    pub id: i64,
    pub service_type: String,
    pub service_key: String,
    pub device: String,
    pub template: String,
    pub config: String,
    pub created_at: DateTime<Utc>,
}
