use sqlx::{Row, sqlite::SqliteRow};

use crate::models::*;

/// Filter empty strings to None — used when DB stores '' instead of NULL
pub fn none_if_empty(opt: Option<String>) -> Option<String> {
    opt.filter(|s| !s.is_empty())
}

/// Map a SQLite row to a Device struct
pub fn map_device_row(row: &SqliteRow) -> Device {
    Device {
        name: row.get("name"),
        address: row.get("address"),
        port: u16::try_from(row.get::<i64, _>("port")).unwrap_or(22),
        ssh_user: none_if_empty(row.get("ssh_user")),
        ssh_pass: none_if_empty(row.get("ssh_pass")),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

pub fn map_device_config_row(row: &SqliteRow) -> DeviceConfig {
    DeviceConfig {
        id: row.get("id"),
        service_type: row.get("service_type"),
        service_key: row.get("service_key"),
        device: row.get("device"),
        template: row.get("template"),
        config: row.get("config"),
        created_at: row.get("created_at"),
    }
}

pub fn map_acl_mapping_row(row: &SqliteRow) -> DeviceAclMapping {
    DeviceAclMapping {
        device: row.get("device"),
        port: u32::try_from(row.get::<i64, _>("port")).unwrap_or_default(),
        protocol: row.get("protocol"),
        updated_at: row.get("updated_at"),
    }
}
