//! Payroll generation
//!
//! Drafts are (re)computed for every active employee of a month. Rows that
//! were already paid are never touched again.

use serde::Serialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::message::{action, resource};
use chrono::NaiveDate;
use shared::models::{Employee, Payroll, SystemSettings};

use super::calculator::{DEFAULT_WORK_DAYS, PayrollInput, calculate};
use crate::core::ServerState;
use crate::db::repository::{
    RepoError, attendance as attendance_repo, employee as employee_repo,
    overtime as overtime_repo, payroll as payroll_repo, shift_template as shift_repo,
    system_settings as settings_repo,
};
use crate::utils::time;

#[derive(Debug, Clone, Serialize)]
pub struct PayrollRun {
    pub period: String,
    /// Drafts created or refreshed by this run
    pub generated: usize,
    /// Employees whose payroll for the period was already paid
    pub skipped_paid: usize,
    pub payrolls: Vec<Payroll>,
}

async fn work_days_of(state: &ServerState, employee: &Employee) -> AppResult<Vec<u32>> {
    if let Some(id) = employee.shift_template_id
        && let Some(template) = shift_repo::find_by_id(&state.pool, id).await?
        && template.is_active
    {
        return Ok(template.work_day_numbers());
    }
    Ok(DEFAULT_WORK_DAYS.to_vec())
}

async fn generate_for(
    state: &ServerState,
    settings: &SystemSettings,
    employee: &Employee,
    period: &str,
    (first, last): (NaiveDate, NaiveDate),
    cutoff: NaiveDate,
) -> AppResult<Option<Payroll>> {
    let from = time::format_date(first);
    let to = time::format_date(last);
    let attendance = attendance_repo::find_for_employee(&state.pool, employee.id, &from, &to).await?;
    let approved = overtime_repo::find_approved(&state.pool, employee.id, &from, &to).await?;
    let work_days = work_days_of(state, employee).await?;

    let breakdown = calculate(&PayrollInput {
        basic_salary: employee.basic_salary,
        overtime_rate: employee.overtime_rate,
        attendance: &attendance,
        approved_overtime: &approved,
        late_penalty: settings.late_penalty,
        absence_penalty: settings.absence_penalty,
        overtime_requires_approval: settings.overtime_requires_approval,
        work_days: &work_days,
        period_start: first,
        cutoff,
    });

    Ok(payroll_repo::upsert_draft(&state.pool, employee.id, period, &breakdown).await?)
}

/// Compute drafts for `period` (`YYYY-MM`)
pub async fn generate(state: &ServerState, period: &str) -> AppResult<PayrollRun> {
    let bounds = time::parse_month(period)?;
    let today = time::today(state.config.timezone);
    let cutoff = bounds.1.min(today);

    let settings = settings_repo::get(&state.pool).await?;
    let employees = employee_repo::find_active(&state.pool).await?;

    let mut generated = 0;
    let mut skipped_paid = 0;
    for employee in &employees {
        match generate_for(state, &settings, employee, period, bounds, cutoff).await? {
            Some(_) => generated += 1,
            None => skipped_paid += 1,
        }
    }

    tracing::info!(period, generated, skipped_paid, "Payroll generated");
    state.broadcast_sync(resource::PAYROLL, action::UPDATED, period, None::<&()>);

    Ok(PayrollRun {
        period: period.to_string(),
        generated,
        skipped_paid,
        payrolls: payroll_repo::find_by_period(&state.pool, period).await?,
    })
}

/// Mark a draft paid; 409 when it already is
pub async fn pay(state: &ServerState, id: i64) -> AppResult<Payroll> {
    let payroll = payroll_repo::mark_paid(&state.pool, id)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => AppError::new(ErrorCode::PayrollNotFound),
            RepoError::Conflict(msg) => AppError::with_message(ErrorCode::PayrollAlreadyPaid, msg),
            other => other.into(),
        })?;
    tracing::info!(payroll_id = id, employee_id = payroll.employee_id, net = payroll.net, "Payroll paid");
    state.broadcast_sync(resource::PAYROLL, action::UPDATED, &id.to_string(), Some(&payroll));
    Ok(payroll)
}
