//! Dine-in orders
//!
//! - **manager**: order lifecycle, item corrections and table settlement
//! - **sequence**: daily `ORD-n` numbers
//! - **money**: decimal-safe totals
//!
//! # Data Flow
//!
//! ```text
//! HTTP handler → OrderManager → SQLite transaction → commit
//!                                                      ↓
//!                                           EventPublisher (rooms)
//! ```

pub mod manager;
pub mod money;
pub mod sequence;

pub use manager::{ManagerError, ManagerResult, OrderManager};
pub use sequence::{NumberLedger, SequenceConfig, SequenceGenerator, SqliteLedger};
