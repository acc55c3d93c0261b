use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite, SqliteConnection, sqlite::SqliteRow};

use crate::models::*;

// ========== Row Mappers ==========

fn map_pool_row(row: &SqliteRow) -> IdPool {
    IdPool {
        name: row.get("name"),
        range_start: row.get("range_start"),
        range_end: row.get("range_end"),
        created_at: row.get("created_at"),
    }
}

fn map_allocation_row(row: &SqliteRow) -> IdAllocation {
    IdAllocation {
        pool: row.get("pool"),
        allocation_id: row.get("allocation_id"),
        owner: row.get("owner"),
        value: row.get("value"),
        created_at: row.get("created_at"),
    }
}

/// Lowest value in `[start, end]` not present in `used` (which must be sorted ascending)
fn lowest_free(start: i64, end: i64, used: &[i64]) -> Option<i64> {
    let mut candidate = start;
    for &v in used {
        if v < candidate {
            continue;
        }
        if v > candidate {
            break;
        }
        candidate += 1;
    }
    (candidate <= end).then_some(candidate)
}

// ========== ID Pool Repo ==========

pub struct IdPoolRepo;

impl IdPoolRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<IdPool>> {
        let rows = sqlx::query("SELECT * FROM id_pools ORDER BY name")
            .fetch_all(pool).await?;
        Ok(rows.iter().map(map_pool_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, name: &str) -> Result<Option<IdPool>> {
        let row = sqlx::query("SELECT * FROM id_pools WHERE name = ?")
            .bind(name).fetch_optional(pool).await?;
        Ok(row.as_ref().map(map_pool_row))
    }

    pub async fn create(pool: &Pool<Sqlite>, req: &CreateIdPoolRequest) -> Result<IdPool> {
        sqlx::query("INSERT INTO id_pools (name, range_start, range_end, created_at) VALUES (?, ?, ?, ?)")
            .bind(&req.name)
            .bind(req.range_start)
            .bind(req.range_end)
            .bind(Utc::now())
            .execute(pool).await?;
        Self::get(pool, &req.name).await?.context("IdPool not found after creation")
    }

    pub async fn list_allocations(pool: &Pool<Sqlite>, name: &str) -> Result<Vec<IdAllocation>> {
        let rows = sqlx::query("SELECT * FROM id_allocations WHERE pool = ? ORDER BY value")
            .bind(name).fetch_all(pool).await?;
        Ok(rows.iter().map(map_allocation_row).collect())
    }

    /// Reserve an ID for `allocation_id`, reusing the one it already holds.
    /// Returns None when the pool does not exist or has no free IDs left.
    ///
    /// The write lock is taken up front (`BEGIN IMMEDIATE`) so concurrent
    /// requests queue on it instead of picking the same free value.
    pub async fn request(
        pool: &Pool<Sqlite>,
        pool_name: &str,
        owner: &str,
        allocation_id: &str,
    ) -> Result<Option<i64>> {
        let mut conn = pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let result = Self::request_locked(&mut conn, pool_name, owner, allocation_id).await;
        match result {
            Ok(value) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                    tracing::warn!("Failed to roll back allocation in pool {}: {}", pool_name, rollback);
                }
                Err(e)
            }
        }
    }

    async fn request_locked(
        conn: &mut SqliteConnection,
        pool_name: &str,
        owner: &str,
        allocation_id: &str,
    ) -> Result<Option<i64>> {
        let existing: Option<(i64,)> = sqlx::query_as(
            "SELECT value FROM id_allocations WHERE pool = ? AND allocation_id = ?",
        )
        .bind(pool_name)
        .bind(allocation_id)
        .fetch_optional(&mut *conn)
        .await?;
        if let Some((value,)) = existing {
            return Ok(Some(value));
        }

        let range: Option<(i64, i64)> = sqlx::query_as(
            "SELECT range_start, range_end FROM id_pools WHERE name = ?",
        )
        .bind(pool_name)
        .fetch_optional(&mut *conn)
        .await?;
        let Some((start, end)) = range else {
            tracing::warn!("ID pool {} does not exist", pool_name);
            return Ok(None);
        };

        let used: Vec<i64> = sqlx::query_scalar(
            "SELECT value FROM id_allocations WHERE pool = ? ORDER BY value",
        )
        .bind(pool_name)
        .fetch_all(&mut *conn)
        .await?;

        let Some(value) = lowest_free(start, end, &used) else {
            tracing::warn!("ID pool {} exhausted ({}-{})", pool_name, start, end);
            return Ok(None);
        };

        sqlx::query(
            "INSERT INTO id_allocations (pool, allocation_id, owner, value, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(pool_name)
        .bind(allocation_id)
        .bind(owner)
        .bind(value)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        tracing::info!("Allocated {}={} from pool {} for {}", allocation_id, value, pool_name, owner);
        Ok(Some(value))
    }

    /// Read the ID currently held by `allocation_id`
    pub async fn read(pool: &Pool<Sqlite>, pool_name: &str, allocation_id: &str) -> Result<Option<i64>> {
        let value: Option<i64> = sqlx::query_scalar(
            "SELECT value FROM id_allocations WHERE pool = ? AND allocation_id = ?",
        )
        .bind(pool_name)
        .bind(allocation_id)
        .fetch_optional(pool)
        .await?;
        Ok(value)
    }

    /// Free the ID held by `allocation_id`. Returns false if nothing was held.
    pub async fn release(pool: &Pool<Sqlite>, pool_name: &str, allocation_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM id_allocations WHERE pool = ? AND allocation_id = ?")
            .bind(pool_name)
            .bind(allocation_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
