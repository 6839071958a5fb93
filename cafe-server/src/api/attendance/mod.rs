//! Attendance API
//!
//! Employee portal (any logged-in employee) plus the owner report.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::permissions::ATTENDANCE_MANAGE;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/attendance", routes())
}

fn routes() -> Router<ServerState> {
    let portal_routes = Router::new()
        .route("/clock-in", post(handler::clock_in))
        .route("/clock-out", post(handler::clock_out))
        .route("/today", get(handler::today))
        .route("/me", get(handler::my_attendance));

    let manage_routes = Router::new()
        .route("/", get(handler::list))
        .layer(middleware::from_fn(require_permission(ATTENDANCE_MANAGE)));

    portal_routes.merge(manage_routes)
}
