//! Promo Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::message::{action, resource};
use shared::models::{DiscountType, Promo, PromoCreate, PromoUpdate};

use crate::core::ServerState;
use crate::db::repository::{RepoError, promo as promo_repo};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_money, validate_percent, validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

const RESOURCE: &str = resource::PROMO;

fn promo_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::PromoNotFound, format!("Promo {id} not found"))
        .with_detail("promo_id", id)
}

fn validate_discount(discount_type: DiscountType, value: f64) -> AppResult<()> {
    match discount_type {
        DiscountType::Percentage => validate_percent(value, "discount_value")?,
        DiscountType::Fixed => validate_money(value, "discount_value")?,
    }
    if value <= 0.0 {
        return Err(AppError::validation("discount_value must be greater than 0")
            .with_detail("field", "discount_value"));
    }
    Ok(())
}

fn validate_window(starts_at: Option<i64>, ends_at: Option<i64>) -> AppResult<()> {
    if let (Some(start), Some(end)) = (starts_at, ends_at)
        && end <= start
    {
        return Err(AppError::validation("ends_at must be after starts_at").with_detail("field", "ends_at"));
    }
    Ok(())
}

fn validate_limits(max_discount: Option<f64>, usage_limit: Option<i64>) -> AppResult<()> {
    if let Some(max) = max_discount {
        validate_money(max, "max_discount")?;
    }
    if let Some(limit) = usage_limit
        && limit < 1
    {
        return Err(AppError::with_message(ErrorCode::ValueOutOfRange, "usage_limit must be at least 1")
            .with_detail("field", "usage_limit"));
    }
    Ok(())
}

/// GET /api/promos
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<Promo>>>> {
    let promos = promo_repo::find_all(&state.pool).await?;
    Ok(ok(promos))
}

/// GET /api/promos/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Promo>>> {
    let promo = promo_repo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| promo_not_found(id))?;
    Ok(ok(promo))
}

/// POST /api/promos - codes are stored upper-cased
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PromoCreate>,
) -> AppResult<Json<ApiResponse<Promo>>> {
    validate_required_text(&payload.code, "code", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_discount(payload.discount_type, payload.discount_value)?;
    validate_money(payload.min_order, "min_order")?;
    validate_limits(payload.max_discount, payload.usage_limit)?;
    validate_window(payload.starts_at, payload.ends_at)?;

    let promo = promo_repo::create(&state.pool, &payload)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::PromoCodeExists, msg),
            other => other.into(),
        })?;

    tracing::info!(promo_id = promo.id, code = %promo.code, "Promo created");
    state.broadcast_sync(RESOURCE, action::CREATED, &promo.id.to_string(), Some(&promo));
    Ok(ok(promo))
}

/// PUT /api/promos/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PromoUpdate>,
) -> AppResult<Json<ApiResponse<Promo>>> {
    let current = promo_repo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| promo_not_found(id))?;

    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_discount(
        payload.discount_type.unwrap_or(current.discount_type),
        payload.discount_value.unwrap_or(current.discount_value),
    )?;
    if let Some(min) = payload.min_order {
        validate_money(min, "min_order")?;
    }
    validate_limits(payload.max_discount, payload.usage_limit)?;
    validate_window(
        payload.starts_at.or(current.starts_at),
        payload.ends_at.or(current.ends_at),
    )?;

    let promo = promo_repo::update(&state.pool, id, &payload)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => promo_not_found(id),
            other => other.into(),
        })?;
    state.broadcast_sync(RESOURCE, action::UPDATED, &id.to_string(), Some(&promo));
    Ok(ok(promo))
}

/// DELETE /api/promos/{id}
///
/// Promos already used on orders are deactivated instead.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    if !promo_repo::delete(&state.pool, id).await? {
        return Err(promo_not_found(id));
    }
    state.broadcast_sync::<()>(RESOURCE, action::DELETED, &id.to_string(), None);
    Ok(ok(true))
}
