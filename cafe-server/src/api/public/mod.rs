//! Customer API (QR table ordering)
//!
//! No token: the customer holds the table's QR token and the order id.
//!
//! | Path | Method |
//! |------|--------|
//! | /api/public/tables/{qr_code} | GET |
//! | /api/public/menu | GET |
//! | /api/public/cafe | GET |
//! | /api/public/promos/{code}?subtotal= | GET |
//! | /api/public/cart/quote | POST |
//! | /api/public/orders | POST |
//! | /api/public/orders/{id} | GET |
//! | /api/public/orders/{id}/payment-method | PUT |
//! | /api/public/orders/{id}/payment-proof | POST (multipart `file`) |
//! | /api/public/orders/{id}/events | GET (SSE) |

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/public", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/tables/{qr_code}", get(handler::table_by_qr))
        .route("/menu", get(handler::menu))
        .route("/cafe", get(handler::cafe))
        .route("/promos/{code}", get(handler::promo_preview))
        .route("/cart/quote", post(handler::quote))
        .route("/orders", post(handler::create_order))
        .route("/orders/{id}", get(handler::get_order))
        .route("/orders/{id}/payment-method", put(handler::select_payment_method))
        .route("/orders/{id}/payment-proof", post(handler::upload_payment_proof))
        .route("/orders/{id}/events", get(handler::order_events))
}
