//! Dining Table Repository

use super::{RepoError, RepoResult};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate, TableStatus};
use sqlx::{SqliteConnection, SqlitePool};

const SELECT: &str =
    "SELECT id, number, qr_code, capacity, status, is_active, created_at, updated_at FROM tables";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<DiningTable>> {
    let tables = sqlx::query_as::<_, DiningTable>(&format!("{SELECT} ORDER BY number"))
        .fetch_all(pool)
        .await?;
    Ok(tables)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(table)
}

pub async fn find_by_qr_code(
    conn: &mut SqliteConnection,
    qr_code: &str,
) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(&format!("{SELECT} WHERE qr_code = ? LIMIT 1"))
        .bind(qr_code)
        .fetch_optional(conn)
        .await?;
    Ok(table)
}

async fn find_by_number(pool: &SqlitePool, number: &str) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(&format!("{SELECT} WHERE number = ? LIMIT 1"))
        .bind(number)
        .fetch_optional(pool)
        .await?;
    Ok(table)
}

/// Create a table with a fresh QR token
pub async fn create(pool: &SqlitePool, data: &DiningTableCreate) -> RepoResult<DiningTable> {
    if find_by_number(pool, &data.number).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Table '{}' already exists",
            data.number
        )));
    }

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let qr_code = uuid::Uuid::new_v4().simple().to_string();
    sqlx::query(
        "INSERT INTO tables (id, number, qr_code, capacity, status, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)",
    )
    .bind(id)
    .bind(&data.number)
    .bind(&qr_code)
    .bind(data.capacity.unwrap_or(4))
    .bind(TableStatus::Available)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create table".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: &DiningTableUpdate) -> RepoResult<DiningTable> {
    if let Some(number) = &data.number
        && let Some(found) = find_by_number(pool, number).await?
        && found.id != id
    {
        return Err(RepoError::Duplicate(format!(
            "Table '{}' already exists",
            number
        )));
    }

    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE tables SET number = COALESCE(?1, number), capacity = COALESCE(?2, capacity), status = COALESCE(?3, status), is_active = COALESCE(?4, is_active), updated_at = ?5 WHERE id = ?6",
    )
    .bind(&data.number)
    .bind(data.capacity)
    .bind(data.status)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Table {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Table {id} not found")))
}

/// Delete a table; refused while it has orders that are still in progress
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let mut tx = super::begin_write(pool).await?;
    if count_active_orders(&mut *tx, id, None).await? > 0 {
        return Err(RepoError::Conflict(
            "Cannot delete a table with active orders".into(),
        ));
    }
    let history: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE table_id = ?")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    // Tables referenced by past orders are retired instead of removed
    let rows = if history > 0 {
        let now = shared::util::now_millis();
        sqlx::query("UPDATE tables SET is_active = 0, updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?
    } else {
        sqlx::query("DELETE FROM tables WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
    };
    tx.commit().await?;
    Ok(rows.rows_affected() > 0)
}

/// Orders on a table that are neither completed nor cancelled
pub async fn count_active_orders(
    conn: &mut SqliteConnection,
    table_id: i64,
    excluding_order: Option<i64>,
) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM orders WHERE table_id = ?1 AND status NOT IN ('completed', 'cancelled') AND (?2 IS NULL OR id != ?2)",
    )
    .bind(table_id)
    .bind(excluding_order)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

pub async fn set_status(
    conn: &mut SqliteConnection,
    table_id: i64,
    status: TableStatus,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE tables SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now)
        .bind(table_id)
        .execute(conn)
        .await?;
    Ok(())
}
