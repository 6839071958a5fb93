//! Unified error codes for the cafe platform
//!
//! This module defines all error codes returned by cafe-server to the customer
//! app, the owner dashboard and the employee portal.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Attendance / workforce errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Menu, promo and upload errors
//! - 7xxx: Table errors
//! - 8xxx: Employee and payroll errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility with the web clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Business rule violation
    BusinessRule = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: Attendance ====================
    /// Employee is outside the cafe geofence
    OutsideGeofence = 3001,
    /// Cafe location has not been configured
    CafeLocationNotConfigured = 3002,
    /// Employee already clocked in for the day
    AlreadyClockedIn = 3003,
    /// Employee has not clocked in yet
    NotClockedIn = 3004,
    /// Employee already clocked out for the day
    AlreadyClockedOut = 3005,
    /// Invalid GPS coordinates
    InvalidCoordinates = 3006,
    /// Overtime request not found
    OvertimeRequestNotFound = 3101,
    /// Overtime request was already reviewed
    OvertimeAlreadyReviewed = 3102,
    /// Shift template not found
    ShiftTemplateNotFound = 3201,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been paid
    OrderAlreadyPaid = 4002,
    /// Order has already been completed
    OrderAlreadyCompleted = 4003,
    /// Order has been cancelled
    OrderCancelled = 4004,
    /// Order is empty
    OrderEmpty = 4007,
    /// Requested status transition is not allowed
    InvalidStatusTransition = 4008,
    /// Order must be paid before this step
    OrderNotPaid = 4009,

    // ==================== 5xxx: Payment ====================
    /// Insufficient payment amount
    PaymentInsufficientAmount = 5002,
    /// Invalid payment method
    PaymentInvalidMethod = 5003,
    /// No payment method selected yet
    PaymentMethodRequired = 5006,
    /// Verification method differs from the order's payment method
    PaymentMethodMismatch = 5007,
    /// Payment proof has not been uploaded
    PaymentProofRequired = 5008,
    /// Payment is not awaiting verification
    PaymentNotAwaitingVerification = 5009,
    /// Payment method can no longer be changed
    PaymentMethodLocked = 5010,

    // ==================== 6xxx: Menu / Promo / Upload ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Menu item is out of stock
    MenuItemOutOfStock = 6003,
    /// Menu item is not available
    MenuItemUnavailable = 6004,
    /// Promo not found
    PromoNotFound = 6101,
    /// Promo code already exists
    PromoCodeExists = 6102,
    /// Promo is not applicable (inactive, expired, exhausted, below minimum)
    PromoNotApplicable = 6103,

    // ==================== 65xx: File Upload ====================
    /// File too large
    FileTooLarge = 6501,
    /// Unsupported file format
    UnsupportedFileFormat = 6502,
    /// Invalid/corrupted image file
    InvalidImageFile = 6503,
    /// No file provided in request
    NoFileProvided = 6504,
    /// Empty file provided
    EmptyFile = 6505,
    /// Image processing failed
    ImageProcessingFailed = 6508,
    /// File storage failed
    FileStorageFailed = 6509,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table is inactive
    TableInactive = 7002,
    /// Table number already exists
    TableNumberExists = 7003,
    /// Table has active orders
    TableHasOrders = 7104,

    // ==================== 8xxx: Employee / Payroll ====================
    /// Employee not found
    EmployeeNotFound = 8001,
    /// Employee username already exists
    EmployeeUsernameExists = 8002,
    /// Cannot deactivate self
    EmployeeCannotDeleteSelf = 8003,
    /// Payroll record not found
    PayrollNotFound = 8201,
    /// Payroll record already paid
    PayrollAlreadyPaid = 8202,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::BusinessRule => "Business rule violation",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Attendance
            ErrorCode::OutsideGeofence => "Too far from the cafe",
            ErrorCode::CafeLocationNotConfigured => "Cafe location is not configured",
            ErrorCode::AlreadyClockedIn => "Already clocked in today",
            ErrorCode::NotClockedIn => "Not clocked in today",
            ErrorCode::AlreadyClockedOut => "Already clocked out today",
            ErrorCode::InvalidCoordinates => "Invalid GPS coordinates",
            ErrorCode::OvertimeRequestNotFound => "Overtime request not found",
            ErrorCode::OvertimeAlreadyReviewed => "Overtime request has already been reviewed",
            ErrorCode::ShiftTemplateNotFound => "Shift template not found",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::OrderAlreadyCompleted => "Order has already been completed",
            ErrorCode::OrderCancelled => "Order has been cancelled",
            ErrorCode::OrderEmpty => "Order is empty",
            ErrorCode::InvalidStatusTransition => "Order status transition is not allowed",
            ErrorCode::OrderNotPaid => "Order has not been paid",

            // Payment
            ErrorCode::PaymentInsufficientAmount => "Insufficient payment amount",
            ErrorCode::PaymentInvalidMethod => "Invalid payment method",
            ErrorCode::PaymentMethodRequired => "No payment method selected",
            ErrorCode::PaymentMethodMismatch => "Payment method does not match the order",
            ErrorCode::PaymentProofRequired => "Payment proof has not been uploaded",
            ErrorCode::PaymentNotAwaitingVerification => "Payment is not awaiting verification",
            ErrorCode::PaymentMethodLocked => "Payment method can no longer be changed",

            // Menu / Promo
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemOutOfStock => "Menu item is out of stock",
            ErrorCode::MenuItemUnavailable => "Menu item is not available",
            ErrorCode::PromoNotFound => "Promo not found",
            ErrorCode::PromoCodeExists => "Promo code already exists",
            ErrorCode::PromoNotApplicable => "Promo is not applicable",

            // File Upload
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::InvalidImageFile => "Invalid image file",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::ImageProcessingFailed => "Image processing failed",
            ErrorCode::FileStorageFailed => "File storage failed",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableInactive => "Table is not active",
            ErrorCode::TableNumberExists => "Table number already exists",
            ErrorCode::TableHasOrders => "Table has active orders",

            // Employee / Payroll
            ErrorCode::EmployeeNotFound => "Employee not found",
            ErrorCode::EmployeeUsernameExists => "Employee username already exists",
            ErrorCode::EmployeeCannotDeleteSelf => "Cannot deactivate own account",
            ErrorCode::PayrollNotFound => "Payroll record not found",
            ErrorCode::PayrollAlreadyPaid => "Payroll record has already been paid",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),
            9 => Ok(ErrorCode::BusinessRule),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Attendance
            3001 => Ok(ErrorCode::OutsideGeofence),
            3002 => Ok(ErrorCode::CafeLocationNotConfigured),
            3003 => Ok(ErrorCode::AlreadyClockedIn),
            3004 => Ok(ErrorCode::NotClockedIn),
            3005 => Ok(ErrorCode::AlreadyClockedOut),
            3006 => Ok(ErrorCode::InvalidCoordinates),
            3101 => Ok(ErrorCode::OvertimeRequestNotFound),
            3102 => Ok(ErrorCode::OvertimeAlreadyReviewed),
            3201 => Ok(ErrorCode::ShiftTemplateNotFound),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyPaid),
            4003 => Ok(ErrorCode::OrderAlreadyCompleted),
            4004 => Ok(ErrorCode::OrderCancelled),
            4007 => Ok(ErrorCode::OrderEmpty),
            4008 => Ok(ErrorCode::InvalidStatusTransition),
            4009 => Ok(ErrorCode::OrderNotPaid),

            // Payment
            5002 => Ok(ErrorCode::PaymentInsufficientAmount),
            5003 => Ok(ErrorCode::PaymentInvalidMethod),
            5006 => Ok(ErrorCode::PaymentMethodRequired),
            5007 => Ok(ErrorCode::PaymentMethodMismatch),
            5008 => Ok(ErrorCode::PaymentProofRequired),
            5009 => Ok(ErrorCode::PaymentNotAwaitingVerification),
            5010 => Ok(ErrorCode::PaymentMethodLocked),

            // Menu / Promo
            6001 => Ok(ErrorCode::MenuItemNotFound),
            6003 => Ok(ErrorCode::MenuItemOutOfStock),
            6004 => Ok(ErrorCode::MenuItemUnavailable),
            6101 => Ok(ErrorCode::PromoNotFound),
            6102 => Ok(ErrorCode::PromoCodeExists),
            6103 => Ok(ErrorCode::PromoNotApplicable),

            // File Upload
            6501 => Ok(ErrorCode::FileTooLarge),
            6502 => Ok(ErrorCode::UnsupportedFileFormat),
            6503 => Ok(ErrorCode::InvalidImageFile),
            6504 => Ok(ErrorCode::NoFileProvided),
            6505 => Ok(ErrorCode::EmptyFile),
            6508 => Ok(ErrorCode::ImageProcessingFailed),
            6509 => Ok(ErrorCode::FileStorageFailed),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),
            7002 => Ok(ErrorCode::TableInactive),
            7003 => Ok(ErrorCode::TableNumberExists),
            7104 => Ok(ErrorCode::TableHasOrders),

            // Employee / Payroll
            8001 => Ok(ErrorCode::EmployeeNotFound),
            8002 => Ok(ErrorCode::EmployeeUsernameExists),
            8003 => Ok(ErrorCode::EmployeeCannotDeleteSelf),
            8201 => Ok(ErrorCode::PayrollNotFound),
            8202 => Ok(ErrorCode::PayrollAlreadyPaid),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::OutsideGeofence.code(), 3001);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::InvalidStatusTransition.code(), 4008);
        assert_eq!(ErrorCode::PaymentInsufficientAmount.code(), 5002);
        assert_eq!(ErrorCode::MenuItemNotFound.code(), 6001);
        assert_eq!(ErrorCode::FileTooLarge.code(), 6501);
        assert_eq!(ErrorCode::TableNotFound.code(), 7001);
        assert_eq!(ErrorCode::EmployeeNotFound.code(), 8001);
        assert_eq!(ErrorCode::PayrollAlreadyPaid.code(), 8202);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
        assert!(!ErrorCode::OrderNotFound.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(3001), Ok(ErrorCode::OutsideGeofence));
        assert_eq!(ErrorCode::try_from(5007), Ok(ErrorCode::PaymentMethodMismatch));
        assert_eq!(ErrorCode::try_from(9002), Ok(ErrorCode::DatabaseError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
        assert_eq!(
            InvalidErrorCode(4242).to_string(),
            "invalid error code: 4242"
        );
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::OrderAlreadyPaid).unwrap();
        assert_eq!(json, "4002");

        let code: ErrorCode = serde_json::from_str("7003").unwrap();
        assert_eq!(code, ErrorCode::TableNumberExists);

        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::NotFound), "3");
        assert_eq!(format!("{}", ErrorCode::OrderNotPaid), "4009");
    }
}
