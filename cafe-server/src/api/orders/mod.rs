//! Staff order API (cashier and kitchen)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::permissions::ORDERS_MANAGE;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/payment-proof", get(handler::payment_proof))
        .route("/{id}/approve", post(handler::approve))
        .route("/{id}/verify-cash", post(handler::verify_cash))
        .route("/{id}/verify-qris", post(handler::verify_qris))
        .route("/{id}/verify-transfer", post(handler::verify_transfer))
        .route("/{id}/reject-payment", post(handler::reject_payment))
        .route("/{id}/status", post(handler::update_status))
        .route("/{id}/cancel", post(handler::cancel))
        .layer(middleware::from_fn(require_permission(ORDERS_MANAGE)))
}
