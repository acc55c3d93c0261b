use anyhow::Result;
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;
use super::row_helpers::map_acl_mapping_row;

pub struct AclMappingRepo;

impl AclMappingRepo {
    pub async fn list(pool: &Pool<Sqlite>, device: &str) -> Result<Vec<DeviceAclMapping>> {
        let rows = sqlx::query("SELECT * FROM acl_alias_mappings WHERE device = ? ORDER BY port")
            .bind(device)
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_acl_mapping_row).collect())
    }

    /// Replace the full mapping set learned from a device
    pub async fn replace(pool: &Pool<Sqlite>, device: &str, mappings: &[AclMapping]) -> Result<()> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM acl_alias_mappings WHERE device = ?")
            .bind(device)
            .execute(&mut *tx)
            .await?;
        for m in mappings {
            sqlx::query(
                "INSERT INTO acl_alias_mappings (device, port, protocol, updated_at) VALUES (?, ?, ?, ?)",
            )
            .bind(device)
            .bind(i64::from(m.port))
            .bind(&m.protocol)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
