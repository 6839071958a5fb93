//! Utilities
//!
//! - [`AppError`] / [`ApiResponse`] - re-exported from `shared::error`
//! - [`ok`] - wrap a handler result in the `{"data": ...}` envelope
//! - logging, business-timezone dates, input validation

pub mod logger;
pub mod time;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

use axum::Json;

/// Success envelope shortcut for handlers
///
/// ```ignore
/// async fn get(...) -> AppResult<Json<ApiResponse<Order>>> {
///     Ok(ok(order))
/// }
/// ```
pub fn ok<T>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}
