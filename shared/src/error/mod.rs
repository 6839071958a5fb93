//! Unified error system for the cafe platform
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`] / [`ErrorResponse`]: the `{data}` and `{error}` envelopes
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ErrorResponse};
//!
//! let err = AppError::validation("Quantity must be between 1 and 99")
//!     .with_detail("field", "quantity");
//! let body = ErrorResponse::from_error(&err);
//! assert_eq!(body.error.code, ErrorCode::ValidationFailed.code());
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult, ErrorBody, ErrorResponse};
