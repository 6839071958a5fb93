//! Dashboard statistics API
//!
//! | Path | Description |
//! |------|-------------|
//! | GET /api/stats/sales | daily revenue and order count |
//! | GET /api/stats/top-items | best sellers by quantity |
//! | GET /api/stats/payment-methods | revenue split by payment method |
//!
//! All take `from` / `to` as inclusive `YYYY-MM-DD` business dates.

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::permissions::REPORTS_VIEW;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stats", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/sales", get(handler::sales))
        .route("/top-items", get(handler::top_items))
        .route("/payment-methods", get(handler::payment_methods))
        .layer(middleware::from_fn(require_permission(REPORTS_VIEW)))
}
