//! Shift Template Repository

use super::{RepoError, RepoResult};
use shared::models::{ShiftTemplate, ShiftTemplateCreate, ShiftTemplateUpdate};
use sqlx::SqlitePool;

const SELECT: &str = "SELECT id, name, start_time, end_time, work_days, is_active, created_at, updated_at FROM shift_templates";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<ShiftTemplate>> {
    let templates = sqlx::query_as::<_, ShiftTemplate>(&format!("{SELECT} ORDER BY start_time"))
        .fetch_all(pool)
        .await?;
    Ok(templates)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<ShiftTemplate>> {
    let template = sqlx::query_as::<_, ShiftTemplate>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(template)
}

pub async fn create(pool: &SqlitePool, data: &ShiftTemplateCreate) -> RepoResult<ShiftTemplate> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let work_days = data.work_days.as_deref().unwrap_or("1,2,3,4,5");
    sqlx::query(
        "INSERT INTO shift_templates (id, name, start_time, end_time, work_days, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.start_time)
    .bind(&data.end_time)
    .bind(work_days)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create shift template".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &ShiftTemplateUpdate,
) -> RepoResult<ShiftTemplate> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE shift_templates SET name = COALESCE(?1, name), start_time = COALESCE(?2, start_time), end_time = COALESCE(?3, end_time), work_days = COALESCE(?4, work_days), is_active = COALESCE(?5, is_active), updated_at = ?6 WHERE id = ?7",
    )
    .bind(&data.name)
    .bind(&data.start_time)
    .bind(&data.end_time)
    .bind(&data.work_days)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Shift template {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Shift template {id} not found")))
}

/// Delete a template; assigned employees fall back to no template
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let mut tx = super::begin_write(pool).await?;
    sqlx::query("UPDATE employees SET shift_template_id = NULL WHERE shift_template_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let rows = sqlx::query("DELETE FROM shift_templates WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(rows.rows_affected() > 0)
}
