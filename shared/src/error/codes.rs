//! Unified error codes for the dine-in engine
//!
//! Error codes are shared by the server, the realtime protocol and the
//! front-end clients. They are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 6xxx: Product errors
//! - 7xxx: Table errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so clients can switch on
/// them without parsing messages.
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
    /// Too many requests from the same client
    RequestRateLimited = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Required role missing
    RoleRequired = 2002,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order already completed
    OrderAlreadyCompleted = 4003,
    /// Order item not found
    OrderItemNotFound = 4006,
    /// Order has no orderable items
    OrderEmpty = 4007,
    /// Status transition not allowed from the current status
    OrderInvalidTransition = 4008,
    /// Order can no longer be modified
    OrderNotModifiable = 4009,
    /// Quantity correction is not a strict decrease
    ItemQuantityNotReduced = 4010,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product has an invalid price
    ProductInvalidPrice = 6002,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table has no open orders
    TableAlreadyEmpty = 7003,
    /// Table is paused and does not accept changes
    TablePaused = 7005,
    /// Table number already used in this restaurant
    TableNumberExists = 7006,
    /// Occupancy is derived from orders and cannot be set by hand
    TableStatusLocked = 7007,
    /// Concurrent writes kept the table busy, retry the request
    TableBusy = 7008,

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
        matches!(self, Self::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            Self::Success => "Operation completed successfully",
            Self::Unknown => "An unknown error occurred",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",
            Self::RequestRateLimited => "Too many requests, try again later",

            // Auth
            Self::NotAuthenticated => "Authentication required",
            Self::TokenExpired => "Token has expired",
            Self::TokenInvalid => "Invalid token",

            // Permission
            Self::PermissionDenied => "Permission denied",
            Self::RoleRequired => "Required role missing",

            // Order
            Self::OrderNotFound => "Order not found",
            Self::OrderAlreadyCompleted => "Order already completed",
            Self::OrderItemNotFound => "Order item not found",
            Self::OrderEmpty => "Order has no items",
            Self::OrderInvalidTransition => "Order status does not allow this transition",
            Self::OrderNotModifiable => "Order can no longer be modified",
            Self::ItemQuantityNotReduced => {
                "New quantity must be lower than the current quantity and above zero"
            }

            // Product
            Self::ProductNotFound => "Product not found",
            Self::ProductInvalidPrice => "Invalid product price",

            // Table
            Self::TableNotFound => "Table not found",
            Self::TableAlreadyEmpty => "Table has no open orders",
            Self::TablePaused => "Table is temporarily not serving",
            Self::TableNumberExists => "Table number already exists",
            Self::TableStatusLocked => "Table occupancy follows its orders",
            Self::TableBusy => "Table is busy, please retry",

            // System
            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when a u16 value does not map to any ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid error code: {}", self.0)
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
            9 => Ok(ErrorCode::RequestRateLimited),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4003 => Ok(ErrorCode::OrderAlreadyCompleted),
            4006 => Ok(ErrorCode::OrderItemNotFound),
            4007 => Ok(ErrorCode::OrderEmpty),
            4008 => Ok(ErrorCode::OrderInvalidTransition),
            4009 => Ok(ErrorCode::OrderNotModifiable),
            4010 => Ok(ErrorCode::ItemQuantityNotReduced),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductInvalidPrice),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),
            7003 => Ok(ErrorCode::TableAlreadyEmpty),
            7005 => Ok(ErrorCode::TablePaused),
            7006 => Ok(ErrorCode::TableNumberExists),
            7007 => Ok(ErrorCode::TableStatusLocked),
            7008 => Ok(ErrorCode::TableBusy),

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
