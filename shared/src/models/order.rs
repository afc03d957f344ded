//! Order Model

use serde::{Deserialize, Serialize};

use super::product::ProductProjection;

/// Order status
///
/// `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    InProgress,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Statuses an order can be in while it still occupies its table
    pub const OPEN: [OrderStatus; 2] = [OrderStatus::InProgress, OrderStatus::Ready];

    pub fn is_open(&self) -> bool {
        matches!(self, Self::InProgress | Self::Ready)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_open()
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Ready => "ready",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the order entered the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderSource {
    /// Customer scanned the table QR code
    QrOrder,
    /// Entered by service staff on behalf of the table
    Staff,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub restaurant_id: i64,
    pub table_id: i64,
    pub table_number: i32,
    pub order_number: String,
    /// Business day the number belongs to (YYYY-MM-DD)
    pub order_day: String,
    /// Total amount in currency unit
    pub order_total: f64,
    pub status: OrderStatus,
    pub source: OrderSource,
    pub member_id: Option<i64>,
    pub completed_by: Option<i64>,
    pub completed_at: Option<i64>,
    pub cancellation_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order line item, unit price captured at order time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    /// Price in currency unit
    pub unit_price: f64,
    pub created_at: i64,
}

/// Line item joined with its product projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemView {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: f64,
    pub line_total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductProjection>,
}

/// Order with its line items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemView>,
}

/// One requested cart line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: f64,
}

/// Create order payload (cumulative cart of the table)
///
/// The ordering member is taken from the caller's token, never from the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub items: Vec<OrderItemInput>,
}

/// Result of a create request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreated {
    /// False when the cart carried nothing beyond what is already ordered
    pub created: bool,
    pub order: OrderDetail,
}

/// Quantity correction payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemQuantityUpdate {
    pub quantity: i32,
}

/// Table cancellation payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderCancel {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Outcome of a table-level completion or cancellation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSettlement {
    pub table_id: i64,
    pub table_number: i32,
    pub order_ids: Vec<i64>,
    pub order_numbers: Vec<String>,
    /// Sum of the affected order totals
    pub total: f64,
}

/// Admin order list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQuery {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub table_number: Option<i32>,
    /// First business day included (YYYY-MM-DD)
    #[serde(default)]
    pub start_date: Option<String>,
    /// Last business day included (YYYY-MM-DD)
    #[serde(default)]
    pub end_date: Option<String>,
    /// Case-insensitive order number fragment
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

/// One page of orders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<OrderDetail>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}
