//! Attendance Repository

use super::{RepoError, RepoResult};
use shared::models::{Attendance, AttendanceWithEmployee};
use sqlx::SqlitePool;

const COLUMNS: &str = "a.id, a.employee_id, a.work_date, a.clock_in_at, a.clock_in_lat, a.clock_in_lng, a.clock_in_distance_m, a.clock_out_at, a.clock_out_lat, a.clock_out_lng, a.clock_out_distance_m, a.scheduled_minutes, a.worked_minutes, a.overtime_minutes, a.is_late, a.late_minutes, a.created_at, a.updated_at";

/// Clock-in values computed by the caller
#[derive(Debug, Clone)]
pub struct ClockIn {
    pub employee_id: i64,
    pub work_date: String,
    pub at: i64,
    pub lat: f64,
    pub lng: f64,
    pub distance_m: f64,
    pub scheduled_minutes: i64,
    pub late_minutes: i64,
}

/// Clock-out values computed by the caller
#[derive(Debug, Clone)]
pub struct ClockOut {
    pub at: i64,
    pub lat: f64,
    pub lng: f64,
    pub distance_m: f64,
    pub worked_minutes: i64,
    pub overtime_minutes: i64,
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Attendance>> {
    let row = sqlx::query_as::<_, Attendance>(&format!("SELECT {COLUMNS} FROM attendance a WHERE a.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_for_day(
    pool: &SqlitePool,
    employee_id: i64,
    work_date: &str,
) -> RepoResult<Option<Attendance>> {
    let row = sqlx::query_as::<_, Attendance>(&format!(
        "SELECT {COLUMNS} FROM attendance a WHERE a.employee_id = ? AND a.work_date = ?"
    ))
    .bind(employee_id)
    .bind(work_date)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// The latest row still missing a clock-out (covers overnight shifts)
pub async fn find_open(pool: &SqlitePool, employee_id: i64) -> RepoResult<Option<Attendance>> {
    let row = sqlx::query_as::<_, Attendance>(&format!(
        "SELECT {COLUMNS} FROM attendance a WHERE a.employee_id = ? AND a.clock_out_at IS NULL ORDER BY a.clock_in_at DESC LIMIT 1"
    ))
    .bind(employee_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// One employee's rows with `work_date` in `[from, to]`
pub async fn find_for_employee(
    pool: &SqlitePool,
    employee_id: i64,
    from: &str,
    to: &str,
) -> RepoResult<Vec<Attendance>> {
    let rows = sqlx::query_as::<_, Attendance>(&format!(
        "SELECT {COLUMNS} FROM attendance a WHERE a.employee_id = ? AND a.work_date >= ? AND a.work_date <= ? ORDER BY a.work_date"
    ))
    .bind(employee_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Owner report: rows with `work_date` in `[from, to]`, optionally one employee
pub async fn find_in_range(
    pool: &SqlitePool,
    from: &str,
    to: &str,
    employee_id: Option<i64>,
) -> RepoResult<Vec<AttendanceWithEmployee>> {
    let rows = sqlx::query_as::<_, AttendanceWithEmployee>(&format!(
        "SELECT {COLUMNS}, e.full_name AS employee_name FROM attendance a JOIN employees e ON e.id = a.employee_id WHERE a.work_date >= ?1 AND a.work_date <= ?2 AND (?3 IS NULL OR a.employee_id = ?3) ORDER BY a.work_date DESC, e.full_name"
    ))
    .bind(from)
    .bind(to)
    .bind(employee_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn clock_in(pool: &SqlitePool, data: &ClockIn) -> RepoResult<Attendance> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO attendance (id, employee_id, work_date, clock_in_at, clock_in_lat, clock_in_lng, clock_in_distance_m, scheduled_minutes, is_late, late_minutes, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?4, ?4)",
    )
    .bind(id)
    .bind(data.employee_id)
    .bind(&data.work_date)
    .bind(data.at)
    .bind(data.lat)
    .bind(data.lng)
    .bind(data.distance_m)
    .bind(data.scheduled_minutes)
    .bind(data.late_minutes > 0)
    .bind(data.late_minutes)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to record clock-in".into()))
}

/// Close an open row; fails with Conflict when it was closed meanwhile
pub async fn clock_out(pool: &SqlitePool, id: i64, data: &ClockOut) -> RepoResult<Attendance> {
    let rows = sqlx::query(
        "UPDATE attendance SET clock_out_at = ?1, clock_out_lat = ?2, clock_out_lng = ?3, clock_out_distance_m = ?4, worked_minutes = ?5, overtime_minutes = ?6, updated_at = ?1 WHERE id = ?7 AND clock_out_at IS NULL",
    )
    .bind(data.at)
    .bind(data.lat)
    .bind(data.lng)
    .bind(data.distance_m)
    .bind(data.worked_minutes)
    .bind(data.overtime_minutes)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::Conflict(format!("Attendance {id} is already closed")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Attendance {id} not found")))
}
