use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// QosService is a QoS policy that l2vpn links refer to by ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QosService {
    pub id: String,
    pub policy_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateQosServiceRequest {
    pub id: String,
    pub policy_name: String,
}

/// Location holds the site address of a device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub device: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLocationRequest {
    pub device: String,
    pub address: String,
}

/// IdPool is an inclusive numeric range that IDs are allocated from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdPool {
    pub name: String,
    pub range_start: i64,
    pub range_end: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateIdPoolRequest {
    pub name: String,
    pub range_start: i64,
    pub range_end: i64,
}

/// IdAllocation records which ID a given allocation holds in a pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocation {
    pub pool: String,
    pub allocation_id: String,
    pub owner: String,
    pub value: i64,
    pub created_at: DateTime<Utc>,
}
