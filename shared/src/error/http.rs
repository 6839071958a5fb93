//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::OvertimeRequestNotFound
            | Self::ShiftTemplateNotFound
            | Self::OrderNotFound
            | Self::MenuItemNotFound
            | Self::PromoNotFound
            | Self::TableNotFound
            | Self::TableInactive
            | Self::EmployeeNotFound
            | Self::PayrollNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::AlreadyClockedIn
            | Self::AlreadyClockedOut
            | Self::OvertimeAlreadyReviewed
            | Self::OrderAlreadyPaid
            | Self::OrderAlreadyCompleted
            | Self::OrderCancelled
            | Self::InvalidStatusTransition
            | Self::PaymentMethodLocked
            | Self::PromoCodeExists
            | Self::TableNumberExists
            | Self::TableHasOrders
            | Self::EmployeeUsernameExists
            | Self::PayrollAlreadyPaid => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied => StatusCode::FORBIDDEN,

            // 402 Payment Required
            Self::PaymentInsufficientAmount => StatusCode::PAYMENT_REQUIRED,

            // 413 Payload Too Large
            Self::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // 422 Unprocessable Entity (request is well-formed but state forbids it)
            Self::BusinessRule
            | Self::CafeLocationNotConfigured
            | Self::NotClockedIn
            | Self::OrderNotPaid
            | Self::PaymentProofRequired
            | Self::PaymentNotAwaitingVerification
            | Self::PaymentMethodRequired
            | Self::MenuItemOutOfStock
            | Self::MenuItemUnavailable
            | Self::PromoNotApplicable => StatusCode::UNPROCESSABLE_ENTITY,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::ImageProcessingFailed
            | Self::FileStorageFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
