//! Attendance Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::models::{Attendance, AttendanceWithEmployee, ClockRequest};

use crate::attendance::service;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::attendance as attendance_repo;
use crate::utils::{ApiResponse, AppResult, ok, time};

#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    /// `YYYY-MM`, current month when absent
    pub month: Option<String>,
    pub employee_id: Option<i64>,
}

fn month_bounds(state: &ServerState, month: Option<&str>) -> AppResult<(String, String)> {
    let month = match month {
        Some(m) => m.to_string(),
        None => time::today(state.config.timezone).format("%Y-%m").to_string(),
    };
    let (first, last) = time::parse_month(&month)?;
    Ok((time::format_date(first), time::format_date(last)))
}

/// POST /api/attendance/clock-in
pub async fn clock_in(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<ClockRequest>,
) -> AppResult<Json<ApiResponse<Attendance>>> {
    let row = service::clock_in(&state, &user, &req).await?;
    Ok(ok(row))
}

/// POST /api/attendance/clock-out
pub async fn clock_out(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<ClockRequest>,
) -> AppResult<Json<ApiResponse<Attendance>>> {
    let row = service::clock_out(&state, &user, &req).await?;
    Ok(ok(row))
}

/// GET /api/attendance/today - today's row, or a shift still open from yesterday
pub async fn today(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Option<Attendance>>>> {
    let today = time::format_date(time::today(state.config.timezone));
    let row = match attendance_repo::find_for_day(&state.pool, user.id, &today).await? {
        Some(row) => Some(row),
        None => attendance_repo::find_open(&state.pool, user.id).await?,
    };
    Ok(ok(row))
}

/// GET /api/attendance/me?month=YYYY-MM
pub async fn my_attendance(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<MonthQuery>,
) -> AppResult<Json<ApiResponse<Vec<Attendance>>>> {
    let (from, to) = month_bounds(&state, query.month.as_deref())?;
    let rows = attendance_repo::find_for_employee(&state.pool, user.id, &from, &to).await?;
    Ok(ok(rows))
}

/// GET /api/attendance?month=YYYY-MM&employee_id=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<MonthQuery>,
) -> AppResult<Json<ApiResponse<Vec<AttendanceWithEmployee>>>> {
    let (from, to) = month_bounds(&state, query.month.as_deref())?;
    let rows = attendance_repo::find_in_range(&state.pool, &from, &to, query.employee_id).await?;
    Ok(ok(rows))
}
