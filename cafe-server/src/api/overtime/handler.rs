//! Overtime Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::message::{action, resource};
use shared::models::{OvertimeCreate, OvertimeRequest, OvertimeReview, OvertimeStatus};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{RepoError, overtime as overtime_repo};
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text, validate_required_text};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok, time};

/// Longest overtime that can be claimed for one day
const MAX_OVERTIME_HOURS: f64 = 12.0;

fn validate_create(req: &OvertimeCreate) -> AppResult<()> {
    time::parse_date(&req.work_date)?;
    if !req.hours.is_finite() || req.hours <= 0.0 || req.hours > MAX_OVERTIME_HOURS {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("hours must be greater than 0 and at most {MAX_OVERTIME_HOURS}"),
        )
        .with_detail("field", "hours"));
    }
    validate_required_text(&req.reason, "reason", MAX_NOTE_LEN)
}

/// POST /api/overtime
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<OvertimeCreate>,
) -> AppResult<Json<ApiResponse<OvertimeRequest>>> {
    validate_create(&req)?;
    let created = overtime_repo::create(&state.pool, user.id, &req).await?;
    tracing::info!(
        employee_id = user.id,
        work_date = %created.work_date,
        hours = created.hours,
        "Overtime requested"
    );
    state.broadcast_sync(resource::OVERTIME, action::CREATED, &created.id.to_string(), Some(&created));
    Ok(ok(created))
}

/// GET /api/overtime/me
pub async fn my_requests(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<OvertimeRequest>>>> {
    let requests = overtime_repo::find_by_employee(&state.pool, user.id).await?;
    Ok(ok(requests))
}

#[derive(Debug, Default, Deserialize)]
pub struct OvertimeListQuery {
    pub status: Option<OvertimeStatus>,
}

/// GET /api/overtime?status=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OvertimeListQuery>,
) -> AppResult<Json<ApiResponse<Vec<OvertimeRequest>>>> {
    let requests = overtime_repo::find_all(&state.pool, query.status).await?;
    Ok(ok(requests))
}

async fn review(
    state: &ServerState,
    id: i64,
    reviewer: &CurrentUser,
    status: OvertimeStatus,
    note: Option<String>,
) -> AppResult<Json<ApiResponse<OvertimeRequest>>> {
    validate_optional_text(&note, "note", MAX_NOTE_LEN)?;
    let reviewed = overtime_repo::review(&state.pool, id, status, reviewer.id, note.as_deref())
        .await
        .map_err(|e| match e {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::OvertimeRequestNotFound, msg),
            RepoError::Conflict(msg) => AppError::with_message(ErrorCode::OvertimeAlreadyReviewed, msg),
            other => other.into(),
        })?;
    tracing::info!(overtime_id = id, reviewer = %reviewer.username, status = ?status, "Overtime reviewed");
    state.broadcast_sync(resource::OVERTIME, action::UPDATED, &id.to_string(), Some(&reviewed));
    Ok(ok(reviewed))
}

/// POST /api/overtime/{id}/approve
pub async fn approve(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    user: CurrentUser,
    body: Option<Json<OvertimeReview>>,
) -> AppResult<Json<ApiResponse<OvertimeRequest>>> {
    let note = body.and_then(|Json(b)| b.note);
    review(&state, id, &user, OvertimeStatus::Approved, note).await
}

/// POST /api/overtime/{id}/reject
pub async fn reject(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    user: CurrentUser,
    body: Option<Json<OvertimeReview>>,
) -> AppResult<Json<ApiResponse<OvertimeRequest>>> {
    let note = body.and_then(|Json(b)| b.note);
    review(&state, id, &user, OvertimeStatus::Rejected, note).await
}
