//! System settings API (owner)
//!
//! Single row: cafe identity and location, geofence radius, lateness grace,
//! tax / service charge and payroll penalties.

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::permissions::SETTINGS_MANAGE;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route(
        "/api/settings",
        get(handler::get)
            .put(handler::update)
            .layer(middleware::from_fn(require_permission(SETTINGS_MANAGE))),
    )
}
