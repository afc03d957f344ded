use shared::error::{AppError, ErrorCode};
use shared::models::OrderStatus;
use thiserror::Error;

use crate::db::repository::RepoError;
use crate::tables::TableError;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] RepoError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Table not found: {0}")]
    TableNotFound(i64),

    #[error("Table {0} is paused")]
    TablePaused(i64),

    #[error("Table {0} has no open orders")]
    NoOpenOrders(i64),

    #[error("Table {0} kept changing, retry")]
    TableBusy(i64),

    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    #[error("Item {item_id} not found in order {order_id}")]
    OrderItemNotFound { order_id: i64, item_id: i64 },

    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidTransition {
        order_id: i64,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("Order {order_id} is {status} and can no longer be modified")]
    OrderNotModifiable { order_id: i64, status: OrderStatus },

    #[error("Quantity can only be lowered: current {current}, requested {requested}")]
    InvalidQuantity { current: i32, requested: i32 },

    #[error("Invalid price {price} for product {product_id}")]
    InvalidPrice { product_id: i64, price: f64 },

    #[error("Invalid item: {0}")]
    InvalidItem(String),

    #[error("Nothing to order")]
    EmptyCart,

    #[error("Forbidden: {0}")]
    Forbidden(&'static str),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for ManagerError {
    fn from(err: sqlx::Error) -> Self {
        ManagerError::Storage(err.into())
    }
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        let message = err.to_string();
        match err {
            ManagerError::Storage(e) => {
                tracing::error!(error = %e, "Order storage error");
                e.into()
            }
            ManagerError::Table(e) => e.into(),
            ManagerError::TableNotFound(id) => {
                AppError::with_message(ErrorCode::TableNotFound, message).with_detail("table_id", id)
            }
            ManagerError::TablePaused(id) => {
                AppError::with_message(ErrorCode::TablePaused, message).with_detail("table_id", id)
            }
            ManagerError::NoOpenOrders(id) => {
                AppError::with_message(ErrorCode::TableAlreadyEmpty, message)
                    .with_detail("table_id", id)
            }
            ManagerError::TableBusy(id) => {
                AppError::with_message(ErrorCode::TableBusy, message).with_detail("table_id", id)
            }
            ManagerError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, message).with_detail("order_id", id)
            }
            ManagerError::OrderItemNotFound { item_id, .. } => {
                AppError::with_message(ErrorCode::OrderItemNotFound, message)
                    .with_detail("item_id", item_id)
            }
            ManagerError::ProductNotFound(id) => {
                AppError::with_message(ErrorCode::ProductNotFound, message)
                    .with_detail("product_id", id)
            }
            ManagerError::InvalidTransition { from, to, .. } => {
                let code = if from == OrderStatus::Completed {
                    ErrorCode::OrderAlreadyCompleted
                } else {
                    ErrorCode::OrderInvalidTransition
                };
                AppError::with_message(code, message)
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
            }
            ManagerError::OrderNotModifiable { status, .. } => {
                AppError::with_message(ErrorCode::OrderNotModifiable, message)
                    .with_detail("status", status.as_str())
            }
            ManagerError::InvalidQuantity { current, requested } => {
                AppError::with_message(ErrorCode::ItemQuantityNotReduced, message)
                    .with_detail("current", current)
                    .with_detail("requested", requested)
            }
            ManagerError::InvalidPrice { .. } => {
                AppError::with_message(ErrorCode::ProductInvalidPrice, message)
            }
            ManagerError::InvalidItem(msg) => AppError::validation(msg),
            ManagerError::EmptyCart => AppError::with_message(ErrorCode::OrderEmpty, message),
            ManagerError::Forbidden(what) => AppError::with_message(
                ErrorCode::RoleRequired,
                format!("Your role cannot {what}"),
            ),
            ManagerError::Internal(msg) => AppError::internal(msg),
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
