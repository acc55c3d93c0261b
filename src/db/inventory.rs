use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use crate::models::*;

// ========== Row Mappers ==========

fn map_qos_row(row: &SqliteRow) -> QosService {
    QosService {
        id: row.get("id"),
        policy_name: row.get("policy_name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn map_location_row(row: &SqliteRow) -> Location {
    Location {
        device: row.get("device"),
        address: row.get("address"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// ========== QoS Service Repo ==========

pub struct QosServiceRepo;

impl QosServiceRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<QosService>> {
        let rows = sqlx::query("SELECT * FROM qos_services ORDER BY id")
            .fetch_all(pool).await?;
        Ok(rows.iter().map(map_qos_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: &str) -> Result<Option<QosService>> {
        let row = sqlx::query("SELECT * FROM qos_services WHERE id = ?")
            .bind(id).fetch_optional(pool).await?;
        Ok(row.as_ref().map(map_qos_row))
    }

    pub async fn upsert(pool: &Pool<Sqlite>, req: &CreateQosServiceRequest) -> Result<QosService> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO qos_services (id, policy_name, created_at, updated_at) VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET policy_name = excluded.policy_name, updated_at = excluded.updated_at
            "#,
        )
        .bind(&req.id)
        .bind(&req.policy_name)
        .bind(now)
        .bind(now)
        .execute(pool).await?;
        Self::get(pool, &req.id).await?.context("QosService not found after upsert")
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM qos_services WHERE id = ?")
            .bind(id).execute(pool).await?;
        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("QosService", id).into());
        }
        Ok(())
    }
}

// ========== Location Repo ==========

pub struct LocationRepo;

impl LocationRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<Location>> {
        let rows = sqlx::query("SELECT * FROM locations ORDER BY device")
            .fetch_all(pool).await?;
        Ok(rows.iter().map(map_location_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, device: &str) -> Result<Option<Location>> {
        let row = sqlx::query("SELECT * FROM locations WHERE device = ?")
            .bind(device).fetch_optional(pool).await?;
        Ok(row.as_ref().map(map_location_row))
    }

    pub async fn upsert(pool: &Pool<Sqlite>, req: &CreateLocationRequest) -> Result<Location> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO locations (device, address, created_at, updated_at) VALUES (?, ?, ?, ?)
            ON CONFLICT(device) DO UPDATE SET address = excluded.address, updated_at = excluded.updated_at
            "#,
        )
        .bind(&req.device)
        .bind(&req.address)
        .bind(now)
        .bind(now)
        .execute(pool).await?;
        Self::get(pool, &req.device).await?.context("Location not found after upsert")
    }

    pub async fn delete(pool: &Pool<Sqlite>, device: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM locations WHERE device = ?")
            .bind(device).execute(pool).await?;
        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Location", device).into());
        }
        Ok(())
    }
}
