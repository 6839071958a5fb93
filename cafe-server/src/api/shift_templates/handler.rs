//! Shift Template Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::message::{action, resource};
use shared::models::{ShiftTemplate, ShiftTemplateCreate, ShiftTemplateUpdate, parse_work_days};

use crate::core::ServerState;
use crate::db::repository::{RepoError, shift_template as shift_repo};
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok, time};

const RESOURCE: &str = resource::SHIFT_TEMPLATE;

fn template_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::ShiftTemplateNotFound, format!("Shift template {id} not found"))
        .with_detail("shift_template_id", id)
}

/// "5, 1,3,3" → "1,3,5"; at least one valid weekday required
fn normalize_work_days(raw: &str) -> AppResult<String> {
    let days = parse_work_days(raw);
    if days.is_empty() {
        return Err(AppError::validation("work_days must list ISO weekdays 1-7")
            .with_detail("field", "work_days"));
    }
    Ok(days
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(","))
}

/// GET /api/shift-templates
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<ShiftTemplate>>>> {
    let templates = shift_repo::find_all(&state.pool).await?;
    Ok(ok(templates))
}

/// GET /api/shift-templates/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<ShiftTemplate>>> {
    let template = shift_repo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| template_not_found(id))?;
    Ok(ok(template))
}

/// POST /api/shift-templates
pub async fn create(
    State(state): State<ServerState>,
    Json(mut payload): Json<ShiftTemplateCreate>,
) -> AppResult<Json<ApiResponse<ShiftTemplate>>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    time::parse_hhmm(&payload.start_time)?;
    time::parse_hhmm(&payload.end_time)?;
    if let Some(days) = &payload.work_days {
        payload.work_days = Some(normalize_work_days(days)?);
    }

    let template = shift_repo::create(&state.pool, &payload).await?;
    state.broadcast_sync(RESOURCE, action::CREATED, &template.id.to_string(), Some(&template));
    Ok(ok(template))
}

/// PUT /api/shift-templates/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<ShiftTemplateUpdate>,
) -> AppResult<Json<ApiResponse<ShiftTemplate>>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(start) = &payload.start_time {
        time::parse_hhmm(start)?;
    }
    if let Some(end) = &payload.end_time {
        time::parse_hhmm(end)?;
    }
    if let Some(days) = &payload.work_days {
        payload.work_days = Some(normalize_work_days(days)?);
    }

    let template = shift_repo::update(&state.pool, id, &payload)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => template_not_found(id),
            other => other.into(),
        })?;
    state.broadcast_sync(RESOURCE, action::UPDATED, &id.to_string(), Some(&template));
    Ok(ok(template))
}

/// DELETE /api/shift-templates/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    if !shift_repo::delete(&state.pool, id).await? {
        return Err(template_not_found(id));
    }
    tracing::info!(shift_template_id = id, "Shift template deleted");
    state.broadcast_sync::<()>(RESOURCE, action::DELETED, &id.to_string(), None);
    Ok(ok(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_work_days() {
        assert_eq!(normalize_work_days("5, 1,3,3").unwrap(), "1,3,5");
        assert!(normalize_work_days("0,8").is_err());
    }
}
