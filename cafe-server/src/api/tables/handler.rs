//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::message::{action, resource};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate};

use crate::core::ServerState;
use crate::db::repository::{RepoError, dining_table as table_repo};
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_required_text};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

const RESOURCE: &str = resource::TABLE;

fn table_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::TableNotFound, format!("Table {id} not found"))
        .with_detail("table_id", id)
}

fn map_repo_error(id: Option<i64>, e: RepoError) -> AppError {
    match (e, id) {
        (RepoError::Duplicate(msg), _) => AppError::with_message(ErrorCode::TableNumberExists, msg),
        (RepoError::Conflict(msg), _) => AppError::with_message(ErrorCode::TableHasOrders, msg),
        (RepoError::NotFound(_), Some(id)) => table_not_found(id),
        (other, _) => other.into(),
    }
}

fn validate_capacity(capacity: Option<i32>) -> AppResult<()> {
    if let Some(c) = capacity
        && !(1..=100).contains(&c)
    {
        return Err(AppError::with_message(ErrorCode::ValueOutOfRange, "capacity must be 1-100")
            .with_detail("field", "capacity"));
    }
    Ok(())
}

/// GET /api/tables
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<DiningTable>>>> {
    let tables = table_repo::find_all(&state.pool).await?;
    Ok(ok(tables))
}

/// GET /api/tables/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let table = table_repo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| table_not_found(id))?;
    Ok(ok(table))
}

/// POST /api/tables - a fresh QR token is generated for the new table
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    validate_required_text(&payload.number, "number", MAX_SHORT_TEXT_LEN)?;
    validate_capacity(payload.capacity)?;

    let table = table_repo::create(&state.pool, &payload)
        .await
        .map_err(|e| map_repo_error(None, e))?;

    state.broadcast_sync(RESOURCE, action::CREATED, &table.id.to_string(), Some(&table));
    Ok(ok(table))
}

/// PUT /api/tables/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    if let Some(number) = &payload.number {
        validate_required_text(number, "number", MAX_SHORT_TEXT_LEN)?;
    }
    validate_capacity(payload.capacity)?;

    let table = table_repo::update(&state.pool, id, &payload)
        .await
        .map_err(|e| map_repo_error(Some(id), e))?;

    state.broadcast_sync(RESOURCE, action::UPDATED, &id.to_string(), Some(&table));
    Ok(ok(table))
}

/// DELETE /api/tables/{id}
///
/// Refused while the table has orders in progress; tables with order
/// history are retired instead of removed.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let removed = table_repo::delete(&state.pool, id)
        .await
        .map_err(|e| map_repo_error(Some(id), e))?;
    if !removed {
        return Err(table_not_found(id));
    }

    state.broadcast_sync::<()>(RESOURCE, action::DELETED, &id.to_string(), None);
    Ok(ok(true))
}
