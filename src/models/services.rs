use serde::{Deserialize, Serialize};

use super::RenderedConfig;

/// Canonical service type values, also used as keys in the store
pub mod service_type {
    pub const L2VPN: &str = "l2vpn";
    pub const ACCESS: &str = "access-python";
}

/// One side of an l2vpn pseudowire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct L2vpnEndpoint {
    pub device_id: String,
    pub interface_id: String,
    pub instance_id: u32,
    pub vlan_id: u16,
    pub ip_address: String,
}

/// Pseudowire parameters shared by both endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct L2vpnLink {
    pub qos_service_id: String,
    pub vc_class: String,
    pub vc_id: u32,
}

/// L2vpnService connects an access device to a delivery device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct L2vpnService {
    pub service_id: String,
    pub link: L2vpnLink,
    pub access_device: L2vpnEndpoint,
    pub delivery_device: L2vpnEndpoint,
}

/// AccessService provisions a customer VLAN between an access and a trunk port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessService {
    pub customer: String,
    pub device: String,
    pub access_ge_interface: String,
    pub trunk_ge_interface: String,
    /// Allocated VLAN, written back by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan: Option<i64>,
}

/// ServiceApplyResponse reports what a create/update produced
#[derive(Debug, Clone, Serialize)]
pub struct ServiceApplyResponse<T> {
    pub service: T,
    pub configs: Vec<RenderedConfig>,
}
