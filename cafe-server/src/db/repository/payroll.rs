//! Payroll Repository

use super::{RepoError, RepoResult};
use shared::models::{Payroll, PayrollStatus};
use sqlx::SqlitePool;

use crate::payroll::PayrollBreakdown;

const SELECT: &str = "SELECT id, employee_id, period, basic_salary, overtime_hours, overtime_pay, late_days, absent_days, late_deduction, absence_deduction, gross, deductions, net, status, paid_at, created_at, updated_at FROM payroll";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Payroll>> {
    let row = sqlx::query_as::<_, Payroll>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_period(pool: &SqlitePool, period: &str) -> RepoResult<Vec<Payroll>> {
    let rows = sqlx::query_as::<_, Payroll>(&format!("{SELECT} WHERE period = ? ORDER BY employee_id"))
        .bind(period)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_for_employee(
    pool: &SqlitePool,
    employee_id: i64,
    period: &str,
) -> RepoResult<Option<Payroll>> {
    let row = sqlx::query_as::<_, Payroll>(&format!("{SELECT} WHERE employee_id = ? AND period = ?"))
        .bind(employee_id)
        .bind(period)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Insert or refresh a draft; a row already marked paid is left untouched
///
/// Returns `None` when the existing row is paid.
pub async fn upsert_draft(
    pool: &SqlitePool,
    employee_id: i64,
    period: &str,
    b: &PayrollBreakdown,
) -> RepoResult<Option<Payroll>> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "INSERT INTO payroll (id, employee_id, period, basic_salary, overtime_hours, overtime_pay, late_days, absent_days, late_deduction, absence_deduction, gross, deductions, net, status, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?15) \
         ON CONFLICT (employee_id, period) DO UPDATE SET basic_salary = excluded.basic_salary, overtime_hours = excluded.overtime_hours, overtime_pay = excluded.overtime_pay, late_days = excluded.late_days, absent_days = excluded.absent_days, late_deduction = excluded.late_deduction, absence_deduction = excluded.absence_deduction, gross = excluded.gross, deductions = excluded.deductions, net = excluded.net, updated_at = excluded.updated_at \
         WHERE payroll.status = ?14",
    )
    .bind(shared::util::snowflake_id())
    .bind(employee_id)
    .bind(period)
    .bind(b.basic_salary)
    .bind(b.overtime_hours)
    .bind(b.overtime_pay)
    .bind(b.late_days)
    .bind(b.absent_days)
    .bind(b.late_deduction)
    .bind(b.absence_deduction)
    .bind(b.gross)
    .bind(b.deductions)
    .bind(b.net)
    .bind(PayrollStatus::Draft)
    .bind(now)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Ok(None);
    }
    find_for_employee(pool, employee_id, period).await
}

pub async fn mark_paid(pool: &SqlitePool, id: i64) -> RepoResult<Payroll> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE payroll SET status = ?1, paid_at = ?2, updated_at = ?2 WHERE id = ?3 AND status = ?4",
    )
    .bind(PayrollStatus::Paid)
    .bind(now)
    .bind(id)
    .bind(PayrollStatus::Draft)
    .execute(pool)
    .await?;

    let row = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Payroll {id} not found")))?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Conflict(format!("Payroll {id} is already paid")));
    }
    Ok(row)
}
