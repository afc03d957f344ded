//! Table State Coordinator
//!
//! Owns table occupancy. A table is `paused` while staff hold it, otherwise
//! `occupied` while it has an open order and `available` when it has none.
//! Staff may only toggle the pause; occupancy is reconciled by the order
//! manager inside its own transactions.

mod coordinator;

pub use coordinator::{SqliteTableCoordinator, TableCoordinator};

use shared::error::{AppError, ErrorCode};
use shared::models::TableStatus;
use thiserror::Error;

use crate::db::repository::RepoError;

/// Table coordinator errors
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Table not found: {0}")]
    NotFound(i64),

    #[error("Table status {requested} is derived from its orders and cannot be set")]
    StatusLocked { requested: TableStatus },

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<sqlx::Error> for TableError {
    fn from(err: sqlx::Error) -> Self {
        TableError::Repo(err.into())
    }
}

impl From<TableError> for AppError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::NotFound(id) => {
                AppError::with_message(ErrorCode::TableNotFound, format!("Table {id} not found"))
                    .with_detail("table_id", id)
            }
            TableError::StatusLocked { requested } => AppError::with_message(
                ErrorCode::TableStatusLocked,
                format!("Table status cannot be set to {requested}"),
            )
            .with_detail("status", requested.as_str()),
            TableError::Repo(e) => e.into(),
        }
    }
}

pub type TableResult<T> = Result<T, TableError>;
