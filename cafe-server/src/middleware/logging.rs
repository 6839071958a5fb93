//! Access log
//!
//! One completion line per request carrying the request id, matched route,
//! employee, status and latency. Public customer routes log with no
//! employee attached.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use crate::auth::CurrentUser;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let started = Instant::now();

    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let method = req.method().clone();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());
    let employee = req
        .extensions()
        .get::<CurrentUser>()
        .map(|u| format!("{}:{}", u.role.as_str(), u.username));

    tracing::debug!(request_id = %request_id, method = %method, route = %route, "request received");

    let response = next.run(req).await;
    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;

    match status {
        500.. => tracing::warn!(
            request_id = %request_id, method = %method, route = %route,
            employee = ?employee, status, latency_ms, "request failed"
        ),
        400..500 => tracing::info!(
            request_id = %request_id, method = %method, route = %route,
            employee = ?employee, status, latency_ms, "request rejected"
        ),
        _ => tracing::info!(
            request_id = %request_id, method = %method, route = %route,
            employee = ?employee, status, latency_ms, "request served"
        ),
    }

    response
}
