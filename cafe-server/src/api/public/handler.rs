//! Customer Handlers

use std::convert::Infallible;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    response::sse::{Event, Sse},
};
use futures::Stream;
use serde::Deserialize;
use shared::models::{
    CreateOrderRequest, DiningTable, MenuItem, OrderDetail, OrderQuote, PublicCafeInfo,
    QuoteRequest, SelectPaymentMethodRequest,
};

use crate::core::ServerState;
use crate::db::repository::{menu_item as menu_repo, system_settings as settings_repo};
use crate::events::{order_filter, sse_response};
use crate::orders::OrderCommand;
use crate::orders::service::{self, PromoPreview};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

/// GET /api/public/tables/{qr_code}
pub async fn table_by_qr(
    State(state): State<ServerState>,
    Path(qr_code): Path<String>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let table = service::find_table(&state.pool, &qr_code).await?;
    Ok(ok(table))
}

/// GET /api/public/menu - items that can be ordered right now
pub async fn menu(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<MenuItem>>>> {
    let items = menu_repo::find_orderable(&state.pool).await?;
    Ok(ok(items))
}

/// GET /api/public/cafe
pub async fn cafe(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<PublicCafeInfo>>> {
    let settings = settings_repo::get(&state.pool).await?;
    Ok(ok(PublicCafeInfo::from(&settings)))
}

#[derive(Debug, Deserialize)]
pub struct PromoPreviewQuery {
    #[serde(default)]
    pub subtotal: f64,
}

/// GET /api/public/promos/{code}?subtotal=
pub async fn promo_preview(
    State(state): State<ServerState>,
    Path(code): Path<String>,
    Query(query): Query<PromoPreviewQuery>,
) -> AppResult<Json<ApiResponse<PromoPreview>>> {
    let preview = service::preview_promo(&state.pool, &code, query.subtotal).await?;
    Ok(ok(preview))
}

/// POST /api/public/cart/quote
pub async fn quote(
    State(state): State<ServerState>,
    Json(req): Json<QuoteRequest>,
) -> AppResult<Json<ApiResponse<OrderQuote>>> {
    let quote = service::quote_cart(&state.pool, &req).await?;
    Ok(ok(quote))
}

/// POST /api/public/orders
pub async fn create_order(
    State(state): State<ServerState>,
    Json(req): Json<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let detail = service::create_order(&state, req).await?;
    Ok(ok(detail))
}

/// GET /api/public/orders/{id}
pub async fn get_order(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let detail = service::load_detail(&state.pool, id).await?;
    Ok(ok(detail))
}

/// PUT /api/public/orders/{id}/payment-method
pub async fn select_payment_method(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<SelectPaymentMethodRequest>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let detail =
        service::execute(&state, id, OrderCommand::SelectPaymentMethod(req.method), None).await?;
    Ok(ok(detail))
}

/// POST /api/public/orders/{id}/payment-proof
pub async fn upload_payment_proof(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let mut upload: Option<(Vec<u8>, Option<String>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().map(|s| s.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?;
            upload = Some((data.to_vec(), filename));
            break;
        }
    }

    let (data, filename) = upload.ok_or_else(|| {
        AppError::with_message(ErrorCode::NoFileProvided, "No 'file' field found")
    })?;

    let detail = service::submit_proof(&state, id, data, filename.as_deref()).await?;
    Ok(ok(detail))
}

/// GET /api/public/orders/{id}/events - changes to this order only
pub async fn order_events(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    // subscribe first so nothing published after the existence check is missed
    let rx = state.events.subscribe();
    service::load_detail(&state.pool, id).await?;
    Ok(sse_response(rx, order_filter(id)))
}
