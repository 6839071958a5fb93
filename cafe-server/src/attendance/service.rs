//! Clock-in / clock-out
//!
//! Both require the employee to be inside the cafe geofence. One attendance
//! row per employee per business date; lateness and scheduled length come
//! from the employee's shift template.

use chrono::NaiveTime;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::message::{action, resource};
use shared::models::{Attendance, ClockRequest, Employee, SystemSettings};
use shared::util::now_millis;

use super::geofence::{GeoPoint, check_geofence};
use super::worktime::{self, DEFAULT_SCHEDULED_MINUTES};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{
    RepoError, attendance as attendance_repo, employee as employee_repo,
    shift_template as shift_repo, system_settings as settings_repo,
};
use crate::utils::time;

/// Shift parameters used for one clock-in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftPlan {
    pub start: Option<NaiveTime>,
    pub scheduled_minutes: i64,
}

impl ShiftPlan {
    /// No template: eight hours, never late
    pub const UNSCHEDULED: Self = Self {
        start: None,
        scheduled_minutes: DEFAULT_SCHEDULED_MINUTES,
    };

    pub fn late_minutes(&self, clock_in: NaiveTime, grace_minutes: i64) -> i64 {
        match self.start {
            Some(start) => worktime::late_minutes(clock_in, start, grace_minutes),
            None => 0,
        }
    }
}

async fn shift_plan(state: &ServerState, employee: &Employee) -> AppResult<ShiftPlan> {
    let Some(template_id) = employee.shift_template_id else {
        return Ok(ShiftPlan::UNSCHEDULED);
    };
    let Some(template) = shift_repo::find_by_id(&state.pool, template_id).await? else {
        return Ok(ShiftPlan::UNSCHEDULED);
    };
    if !template.is_active {
        return Ok(ShiftPlan::UNSCHEDULED);
    }
    let start = time::parse_hhmm(&template.start_time)?;
    let end = time::parse_hhmm(&template.end_time)?;
    Ok(ShiftPlan {
        start: Some(start),
        scheduled_minutes: worktime::scheduled_minutes(start, end),
    })
}

fn within_geofence(settings: &SystemSettings, req: &ClockRequest) -> AppResult<f64> {
    let cafe = settings
        .cafe_location()
        .map(|(lat, lng)| GeoPoint::new(lat, lng));
    let distance = check_geofence(
        GeoPoint::new(req.latitude, req.longitude),
        cafe,
        settings.geofence_radius_m,
    )?;
    Ok(distance)
}

async fn active_employee(state: &ServerState, user: &CurrentUser) -> AppResult<Employee> {
    employee_repo::find_by_id(&state.pool, user.id)
        .await?
        .filter(|e| e.is_active)
        .ok_or_else(|| AppError::new(ErrorCode::EmployeeNotFound))
}

fn publish(state: &ServerState, act: &str, row: &Attendance) {
    state.broadcast_sync(resource::ATTENDANCE, act, &row.id.to_string(), Some(row));
}

pub async fn clock_in(
    state: &ServerState,
    user: &CurrentUser,
    req: &ClockRequest,
) -> AppResult<Attendance> {
    let settings = settings_repo::get(&state.pool).await?;
    let distance_m = within_geofence(&settings, req).inspect_err(|e| {
        tracing::warn!(employee_id = user.id, error = %e, "Clock-in rejected");
    })?;

    let tz = state.config.timezone;
    let now = now_millis();
    let work_date = time::format_date(time::local_date_of(now, tz));

    // a shift left open past midnight has to be closed first
    if let Some(open) = attendance_repo::find_open(&state.pool, user.id).await? {
        return Err(AppError::new(ErrorCode::AlreadyClockedIn).with_detail("work_date", open.work_date));
    }
    if attendance_repo::find_for_day(&state.pool, user.id, &work_date)
        .await?
        .is_some()
    {
        return Err(AppError::new(ErrorCode::AlreadyClockedIn).with_detail("work_date", work_date));
    }

    let employee = active_employee(state, user).await?;
    let plan = shift_plan(state, &employee).await?;
    let late_minutes = plan.late_minutes(time::local_time_of(now, tz), settings.late_grace_minutes);

    let data = attendance_repo::ClockIn {
        employee_id: employee.id,
        work_date: work_date.clone(),
        at: now,
        lat: req.latitude,
        lng: req.longitude,
        distance_m,
        scheduled_minutes: plan.scheduled_minutes,
        late_minutes,
    };
    let row = attendance_repo::clock_in(&state.pool, &data)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => {
                AppError::new(ErrorCode::AlreadyClockedIn).with_detail("work_date", work_date.clone())
            }
            other => other.into(),
        })?;

    tracing::info!(
        employee_id = employee.id,
        work_date = %row.work_date,
        distance_m = distance_m.round(),
        late_minutes,
        "Clocked in"
    );
    publish(state, action::CREATED, &row);
    Ok(row)
}

pub async fn clock_out(
    state: &ServerState,
    user: &CurrentUser,
    req: &ClockRequest,
) -> AppResult<Attendance> {
    let settings = settings_repo::get(&state.pool).await?;
    let distance_m = within_geofence(&settings, req).inspect_err(|e| {
        tracing::warn!(employee_id = user.id, error = %e, "Clock-out rejected");
    })?;

    let tz = state.config.timezone;
    let now = now_millis();

    // the open row may belong to yesterday for a shift past midnight
    let Some(open) = attendance_repo::find_open(&state.pool, user.id).await? else {
        let today = time::format_date(time::local_date_of(now, tz));
        return match attendance_repo::find_for_day(&state.pool, user.id, &today).await? {
            Some(_) => Err(AppError::new(ErrorCode::AlreadyClockedOut)),
            None => Err(AppError::new(ErrorCode::NotClockedIn)),
        };
    };

    let worked_minutes = worktime::minutes_between(open.clock_in_at, now);
    let data = attendance_repo::ClockOut {
        at: now,
        lat: req.latitude,
        lng: req.longitude,
        distance_m,
        worked_minutes,
        overtime_minutes: worktime::overtime_minutes(worked_minutes, open.scheduled_minutes),
    };
    let row = attendance_repo::clock_out(&state.pool, open.id, &data)
        .await
        .map_err(|e| match e {
            RepoError::Conflict(_) => AppError::new(ErrorCode::AlreadyClockedOut),
            other => other.into(),
        })?;

    tracing::info!(
        employee_id = user.id,
        work_date = %row.work_date,
        worked_minutes,
        overtime_minutes = data.overtime_minutes,
        "Clocked out"
    );
    publish(state, action::UPDATED, &row);
    Ok(row)
}
