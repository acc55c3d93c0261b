use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// AclMapping ties a TCP port to the protocol keyword a device uses for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclMapping {
    pub port: u32,
    pub protocol: String,
}

/// Stored AclMapping learned from a device
#[derive(Debug, Clone, Serialize)]
pub struct DeviceAclMapping {
    pub device: String,
    pub port: u32,
    pub protocol: String,
    pub updated_at: DateTime<Utc>,
}

/// AclAliasMappingResponse is the output of the acl-alias-mapping action
#[derive(Debug, Clone, Serialize)]
pub struct AclAliasMappingResponse {
    pub device: String,
    pub acl_mapping: Vec<AclMapping>,
}
