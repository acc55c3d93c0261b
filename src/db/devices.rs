use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;
use super::row_helpers::map_device_row;

pub struct DeviceRepo;

impl DeviceRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<Device>> {
        let rows = sqlx::query("SELECT * FROM devices ORDER BY name")
            .fetch_all(pool).await?;
        Ok(rows.iter().map(map_device_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, name: &str) -> Result<Option<Device>> {
        let row = sqlx::query("SELECT * FROM devices WHERE name = ?")
            .bind(name).fetch_optional(pool).await?;
        Ok(row.as_ref().map(map_device_row))
    }

    /// Insert a device, replacing address and credentials if it already exists
    pub async fn upsert(pool: &Pool<Sqlite>, req: &CreateDeviceRequest) -> Result<Device> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO devices (name, address, port, ssh_user, ssh_pass, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                address = excluded.address,
                port = excluded.port,
                ssh_user = excluded.ssh_user,
                ssh_pass = excluded.ssh_pass,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&req.name)
        .bind(&req.address)
        .bind(i64::from(req.port.unwrap_or(22)))
        .bind(req.ssh_user.as_deref().unwrap_or(""))
        .bind(req.ssh_pass.as_deref().unwrap_or(""))
        .bind(now)
        .bind(now)
        .execute(pool).await?;
        Self::get(pool, &req.name).await?.context("Device not found after upsert")
    }

    pub async fn delete(pool: &Pool<Sqlite>, name: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM devices WHERE name = ?")
            .bind(name).execute(pool).await?;
        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Device", name).into());
        }
        Ok(())
    }
}
