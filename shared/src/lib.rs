//! Shared types for the dine-in engine
//!
//! Error codes, domain models and the realtime protocol used by the server
//! and by the kitchen, service and customer clients.

pub mod error;
pub mod models;
pub mod realtime;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
