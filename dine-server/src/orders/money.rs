//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts are `f64` at rest and on the wire. Every sum goes through
//! `Decimal` and is rounded back to 2 decimal places.

use rust_decimal::prelude::*;
use shared::models::{OrderItem, OrderItemInput};

use super::manager::ManagerError;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per item
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
const MAX_QUANTITY: i32 = 9999;

/// Validate one requested cart line
pub fn validate_line(item: &OrderItemInput) -> Result<(), ManagerError> {
    if !item.unit_price.is_finite() || item.unit_price < 0.0 || item.unit_price > MAX_PRICE {
        return Err(ManagerError::InvalidPrice {
            product_id: item.product_id,
            price: item.unit_price,
        });
    }
    if item.quantity <= 0 || item.quantity > MAX_QUANTITY {
        return Err(ManagerError::InvalidItem(format!(
            "quantity must be between 1 and {}, got {} for product {}",
            MAX_QUANTITY, item.quantity, item.product_id
        )));
    }
    Ok(())
}

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// quantity × unit price
pub fn line_total(quantity: i32, unit_price: f64) -> Decimal {
    to_decimal(unit_price) * Decimal::from(quantity)
}

/// Σ quantity × unit price over the items of an order
pub fn order_total(items: &[OrderItem]) -> f64 {
    let sum: Decimal = items
        .iter()
        .map(|item| line_total(item.quantity, item.unit_price))
        .sum();
    to_f64(sum)
}
