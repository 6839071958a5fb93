//! Router assembly and tower layers

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::api;
use crate::core::{Config, ServerState};
use crate::middleware::{REQUEST_ID_HEADER, logging_middleware};

/// Multipart framing on top of the proof image itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// All routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Public
        .merge(api::health::router())
        .merge(api::public::router())
        // Authenticated
        .merge(api::auth::router())
        .merge(api::events::router())
        .merge(api::orders::router())
        .merge(api::attendance::router())
        .merge(api::overtime::router())
        // Management
        .merge(api::payroll::router())
        .merge(api::pricing::router())
        .merge(api::cash::router())
        .merge(api::employees::router())
        .merge(api::shift_templates::router())
        .merge(api::tables::router())
        .merge(api::menu::router())
        .merge(api::promos::router())
        .merge(api::settings::router())
        .merge(api::stats::router())
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allowed_origins.is_empty() {
        if config.is_production() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty in production; allowing any origin");
        }
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|o| {
            HeaderValue::from_str(o)
                .inspect_err(|_| tracing::warn!(origin = %o, "Ignoring invalid CORS origin"))
                .ok()
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Fully configured application
///
/// Used by the HTTP server and by the integration tests (`oneshot`).
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    let config = &state.config;
    build_router()
        // ========== Tower HTTP Middleware ==========
        .layer(DefaultBodyLimit::max(
            config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES,
        ))
        .layer(TimeoutLayer::new(Duration::from_millis(
            config.request_timeout_ms,
        )))
        .layer(cors_layer(config))
        .layer(CompressionLayer::new())
        // Request logging
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        // ========== Application Middleware ==========
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        // JWT authentication - outermost, so CurrentUser is visible to logging
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_auth,
        ))
}
