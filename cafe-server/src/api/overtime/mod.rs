//! Overtime API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::permissions::ATTENDANCE_MANAGE;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/overtime", routes())
}

fn routes() -> Router<ServerState> {
    let portal_routes = Router::new()
        .route("/", post(handler::create))
        .route("/me", get(handler::my_requests));

    let manage_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}/approve", post(handler::approve))
        .route("/{id}/reject", post(handler::reject))
        .layer(middleware::from_fn(require_permission(ATTENDANCE_MANAGE)));

    portal_routes.merge(manage_routes)
}
