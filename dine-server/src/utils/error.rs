//! Error types, re-exported from `shared::error`
//!
//! ```ignore
//! Err(AppError::not_found("Order 42"))
//! Ok(ok(order))
//! ```

use axum::Json;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// Wrap data in a success envelope
pub fn ok<T: serde::Serialize>(data: T) -> AppResult<Json<ApiResponse<T>>> {
    Ok(Json(ApiResponse::success(data)))
}

/// Wrap data in a success envelope with a custom message
pub fn ok_with_message<T: serde::Serialize>(
    message: impl Into<String>,
    data: T,
) -> AppResult<Json<ApiResponse<T>>> {
    Ok(Json(ApiResponse::success_with_message(message, data)))
}
