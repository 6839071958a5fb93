//! Menu Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::message::{action, resource};
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate, StockAdjust};

use crate::core::ServerState;
use crate::db::repository::{RepoError, menu_item as menu_repo};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_money, validate_optional_text,
    validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

const RESOURCE: &str = resource::MENU_ITEM;

fn item_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::MenuItemNotFound, format!("Menu item {id} not found"))
        .with_detail("menu_item_id", id)
}

fn map_repo_error(id: i64, e: RepoError) -> AppError {
    match e {
        RepoError::NotFound(_) => item_not_found(id),
        RepoError::Validation(msg) => {
            AppError::with_message(ErrorCode::ValueOutOfRange, msg).with_detail("menu_item_id", id)
        }
        other => other.into(),
    }
}

fn validate_count(value: Option<i64>, field: &str) -> AppResult<()> {
    if let Some(v) = value
        && v < 0
    {
        return Err(AppError::with_message(ErrorCode::ValueOutOfRange, format!("{field} must not be negative"))
            .with_detail("field", field));
    }
    Ok(())
}

fn validate_price(price: f64) -> AppResult<()> {
    validate_money(price, "price")?;
    if price == 0.0 {
        return Err(AppError::validation("price must be greater than 0").with_detail("field", "price"));
    }
    Ok(())
}

/// GET /api/menu - every item, including unavailable ones
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<MenuItem>>>> {
    let items = menu_repo::find_all(&state.pool).await?;
    Ok(ok(items))
}

/// GET /api/menu/low-stock
pub async fn low_stock(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<MenuItem>>>> {
    let items = menu_repo::find_low_stock(&state.pool).await?;
    Ok(ok(items))
}

/// GET /api/menu/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let item = menu_repo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| item_not_found(id))?;
    Ok(ok(item))
}

/// POST /api/menu
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MenuItemCreate>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;
    validate_price(payload.price)?;
    validate_money(payload.cost, "cost")?;
    validate_count(payload.stock, "stock")?;
    validate_count(payload.low_stock_threshold, "low_stock_threshold")?;

    let item = menu_repo::create(&state.pool, &payload).await?;
    state.broadcast_sync(RESOURCE, action::CREATED, &item.id.to_string(), Some(&item));
    Ok(ok(item))
}

/// PUT /api/menu/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuItemUpdate>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;
    if let Some(price) = payload.price {
        validate_price(price)?;
    }
    if let Some(cost) = payload.cost {
        validate_money(cost, "cost")?;
    }
    validate_count(payload.stock, "stock")?;
    validate_count(payload.low_stock_threshold, "low_stock_threshold")?;

    let item = menu_repo::update(&state.pool, id, &payload)
        .await
        .map_err(|e| map_repo_error(id, e))?;
    state.broadcast_sync(RESOURCE, action::UPDATED, &id.to_string(), Some(&item));
    Ok(ok(item))
}

/// DELETE /api/menu/{id}
///
/// Items that appear on past orders are made unavailable instead.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    if !menu_repo::delete(&state.pool, id).await? {
        return Err(item_not_found(id));
    }
    state.broadcast_sync::<()>(RESOURCE, action::DELETED, &id.to_string(), None);
    Ok(ok(true))
}

/// POST /api/menu/{id}/stock {delta}
pub async fn adjust_stock(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<StockAdjust>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let item = menu_repo::adjust_stock(&state.pool, id, req.delta)
        .await
        .map_err(|e| map_repo_error(id, e))?;

    tracing::info!(menu_item_id = id, delta = req.delta, stock = ?item.stock, "Stock adjusted");
    if item.is_low_stock() {
        tracing::warn!(menu_item_id = id, name = %item.name, stock = ?item.stock, "Menu item is low on stock");
    }
    state.broadcast_sync(RESOURCE, action::UPDATED, &id.to_string(), Some(&item));
    Ok(ok(item))
}
