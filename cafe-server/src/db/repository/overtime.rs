//! Overtime Request Repository

use super::{RepoError, RepoResult};
use shared::models::{OvertimeCreate, OvertimeRequest, OvertimeStatus};
use sqlx::SqlitePool;

const SELECT: &str = "SELECT id, employee_id, work_date, hours, reason, status, reviewed_by, reviewed_at, review_note, created_at FROM overtime_requests";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<OvertimeRequest>> {
    let req = sqlx::query_as::<_, OvertimeRequest>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(req)
}

pub async fn find_by_employee(pool: &SqlitePool, employee_id: i64) -> RepoResult<Vec<OvertimeRequest>> {
    let reqs = sqlx::query_as::<_, OvertimeRequest>(&format!(
        "{SELECT} WHERE employee_id = ? ORDER BY work_date DESC, created_at DESC"
    ))
    .bind(employee_id)
    .fetch_all(pool)
    .await?;
    Ok(reqs)
}

pub async fn find_all(pool: &SqlitePool, status: Option<OvertimeStatus>) -> RepoResult<Vec<OvertimeRequest>> {
    let reqs = sqlx::query_as::<_, OvertimeRequest>(&format!(
        "{SELECT} WHERE (?1 IS NULL OR status = ?1) ORDER BY created_at DESC"
    ))
    .bind(status)
    .fetch_all(pool)
    .await?;
    Ok(reqs)
}

/// Approved requests of one employee with `work_date` in `[from, to]`
pub async fn find_approved(
    pool: &SqlitePool,
    employee_id: i64,
    from: &str,
    to: &str,
) -> RepoResult<Vec<OvertimeRequest>> {
    let reqs = sqlx::query_as::<_, OvertimeRequest>(&format!(
        "{SELECT} WHERE employee_id = ? AND status = ? AND work_date >= ? AND work_date <= ?"
    ))
    .bind(employee_id)
    .bind(OvertimeStatus::Approved)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;
    Ok(reqs)
}

pub async fn create(
    pool: &SqlitePool,
    employee_id: i64,
    data: &OvertimeCreate,
) -> RepoResult<OvertimeRequest> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO overtime_requests (id, employee_id, work_date, hours, reason, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(id)
    .bind(employee_id)
    .bind(&data.work_date)
    .bind(data.hours)
    .bind(&data.reason)
    .bind(OvertimeStatus::Pending)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create overtime request".into()))
}

/// Approve or reject a pending request; Conflict when it was already reviewed
pub async fn review(
    pool: &SqlitePool,
    id: i64,
    status: OvertimeStatus,
    reviewer_id: i64,
    note: Option<&str>,
) -> RepoResult<OvertimeRequest> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE overtime_requests SET status = ?1, reviewed_by = ?2, reviewed_at = ?3, review_note = ?4 WHERE id = ?5 AND status = ?6",
    )
    .bind(status)
    .bind(reviewer_id)
    .bind(now)
    .bind(note)
    .bind(id)
    .bind(OvertimeStatus::Pending)
    .execute(pool)
    .await?;

    let req = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Overtime request {id} not found")))?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Conflict(format!(
            "Overtime request {id} was already reviewed"
        )));
    }
    Ok(req)
}
