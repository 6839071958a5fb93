//! Auth API

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub use handler::{LoginRequest, LoginResponse, UserInfo};

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // login is skipped by require_auth
        .route("/login", post(handler::login))
        .route("/me", get(handler::me))
}
