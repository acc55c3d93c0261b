use anyhow::{Context, Result};
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{Pool, Sqlite};

use crate::models::*;
use super::row_helpers::map_device_config_row;

/// Service instances are stored as JSON documents keyed by (type, key)
pub struct ServiceInstanceRepo;

impl ServiceInstanceRepo {
    pub async fn list<T: DeserializeOwned>(pool: &Pool<Sqlite>, service_type: &str) -> Result<Vec<T>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT data FROM service_instances WHERE service_type = ? ORDER BY service_key",
        )
        .bind(service_type)
        .fetch_all(pool)
        .await?;
        rows.iter()
            .map(|(data,)| {
                serde_json::from_str(data)
                    .with_context(|| format!("Corrupt {} service instance", service_type))
            })
            .collect()
    }

    pub async fn get<T: DeserializeOwned>(
        pool: &Pool<Sqlite>,
        service_type: &str,
        key: &str,
    ) -> Result<Option<T>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT data FROM service_instances WHERE service_type = ? AND service_key = ?",
        )
        .bind(service_type)
        .bind(key)
        .fetch_optional(pool)
        .await?;
        row.map(|(data,)| {
            serde_json::from_str(&data)
                .with_context(|| format!("Corrupt {} service instance {}", service_type, key))
        })
        .transpose()
    }

    /// Store an instance together with the configs it produced, replacing
    /// whatever a previous version of the instance produced.
    pub async fn save<T: Serialize>(
        pool: &Pool<Sqlite>,
        service_type: &str,
        key: &str,
        instance: &T,
        configs: &[RenderedConfig],
    ) -> Result<()> {
        let data = serde_json::to_string(instance)?;
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO service_instances (service_type, service_key, data, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(service_type, service_key) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at
            "#,
        )
        .bind(service_type)
        .bind(key)
        .bind(&data)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM device_configs WHERE service_type = ? AND service_key = ?")
            .bind(service_type)
            .bind(key)
            .execute(&mut *tx)
            .await?;

        for cfg in configs {
            sqlx::query(
                "INSERT INTO device_configs (service_type, service_key, device, template, config, created_at) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(service_type)
            .bind(key)
            .bind(&cfg.device)
            .bind(&cfg.template)
            .bind(&cfg.config)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Remove an instance and every config it produced
    pub async fn delete(pool: &Pool<Sqlite>, service_type: &str, key: &str) -> Result<()> {
        let mut tx = pool.begin().await?;
        let result = sqlx::query("DELETE FROM service_instances WHERE service_type = ? AND service_key = ?")
            .bind(service_type)
            .bind(key)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new(service_type, key).into());
        }
        sqlx::query("DELETE FROM device_configs WHERE service_type = ? AND service_key = ?")
            .bind(service_type)
            .bind(key)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn list_device_configs(pool: &Pool<Sqlite>, device: &str) -> Result<Vec<DeviceConfig>> {
        let rows = sqlx::query("SELECT * FROM device_configs WHERE device = ? ORDER BY id")
            .bind(device)
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_device_config_row).collect())
    }
}
