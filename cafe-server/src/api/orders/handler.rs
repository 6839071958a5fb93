//! Staff Order Handlers
//!
//! Every mutation goes through [`service::execute`] so the lifecycle rules
//! and the compare-and-set write apply uniformly.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;
use shared::models::{
    CancelOrderRequest, Order, OrderDetail, OrderStatus, PaymentMethod, PaymentStatus,
    RejectPaymentRequest, UpdateOrderStatusRequest, VerifyPaymentRequest,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::order::{self as order_repo, OrderFilter};
use crate::orders::OrderCommand;
use crate::orders::service;
use crate::utils::{ApiResponse, AppResult, ok, time};

const DEFAULT_LIST_LIMIT: i64 = 200;
const MAX_LIST_LIMIT: i64 = 1000;

#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    /// Business date `YYYY-MM-DD`
    pub date: Option<String>,
    pub limit: Option<i64>,
}

/// GET /api/orders?status=&payment_status=&date=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let tz = state.config.timezone;
    let (from, to) = match query.date.as_deref() {
        Some(date) => {
            let day = time::parse_date(date)?;
            (Some(time::day_start_millis(day, tz)), Some(time::day_end_millis(day, tz)))
        }
        None => (None, None),
    };
    let filter = OrderFilter {
        status: query.status,
        payment_status: query.payment_status,
        from,
        to,
        limit: query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT),
    };
    let orders = order_repo::list(&state.pool, &filter).await?;
    Ok(ok(orders))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let detail = service::load_detail(&state.pool, id).await?;
    Ok(ok(detail))
}

/// GET /api/orders/{id}/payment-proof - JPEG bytes of the latest upload
pub async fn payment_proof(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let bytes = service::proof_image(&state, id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (header::CACHE_CONTROL, "private, max-age=3600"),
        ],
        bytes,
    ))
}

/// POST /api/orders/{id}/approve - verify with the customer's chosen method
///
/// The body is optional; cash approvals may carry `amount_received`.
pub async fn approve(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    user: CurrentUser,
    body: Option<Json<VerifyPaymentRequest>>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let amount_received = body.and_then(|Json(b)| b.amount_received);
    let detail = service::approve(&state, id, amount_received, &user).await?;
    Ok(ok(detail))
}

async fn verify(
    state: &ServerState,
    id: i64,
    user: &CurrentUser,
    method: PaymentMethod,
    amount_received: Option<f64>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let command = OrderCommand::VerifyPayment {
        method,
        amount_received,
    };
    let detail = service::execute(state, id, command, Some(user)).await?;
    Ok(ok(detail))
}

/// POST /api/orders/{id}/verify-cash
pub async fn verify_cash(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    user: CurrentUser,
    Json(req): Json<VerifyPaymentRequest>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    verify(&state, id, &user, PaymentMethod::Cash, req.amount_received).await
}

/// POST /api/orders/{id}/verify-qris
pub async fn verify_qris(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    verify(&state, id, &user, PaymentMethod::Qris, None).await
}

/// POST /api/orders/{id}/verify-transfer
pub async fn verify_transfer(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    verify(&state, id, &user, PaymentMethod::Transfer, None).await
}

/// POST /api/orders/{id}/reject-payment
pub async fn reject_payment(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    user: CurrentUser,
    Json(req): Json<RejectPaymentRequest>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let command = OrderCommand::RejectPayment { reason: req.reason };
    let detail = service::execute(&state, id, command, Some(&user)).await?;
    Ok(ok(detail))
}

/// POST /api/orders/{id}/status - kitchen flow
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    user: CurrentUser,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let command = match req.status {
        OrderStatus::Cancelled => OrderCommand::Cancel { reason: None },
        next => OrderCommand::Advance(next),
    };
    let detail = service::execute(&state, id, command, Some(&user)).await?;
    Ok(ok(detail))
}

/// POST /api/orders/{id}/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    user: CurrentUser,
    Json(req): Json<CancelOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let command = OrderCommand::Cancel { reason: req.reason };
    let detail = service::execute(&state, id, command, Some(&user)).await?;
    Ok(ok(detail))
}
