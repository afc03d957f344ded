//! Order Item Repository

use shared::models::OrderItem;
use sqlx::{SqliteConnection, SqliteExecutor};

use super::{RepoResult, placeholders};

pub async fn find_by_order<'e, E: SqliteExecutor<'e>>(
    executor: E,
    order_id: i64,
) -> RepoResult<Vec<OrderItem>> {
    let items = sqlx::query_as("SELECT * FROM order_item WHERE order_id = ? ORDER BY created_at, id")
        .bind(order_id)
        .fetch_all(executor)
        .await?;
    Ok(items)
}

/// Items of several orders at once
pub async fn find_by_orders(
    conn: &mut SqliteConnection,
    order_ids: &[i64],
) -> RepoResult<Vec<OrderItem>> {
    if order_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT * FROM order_item WHERE order_id IN ({}) ORDER BY created_at, id",
        placeholders(order_ids.len())
    );
    let mut query = sqlx::query_as(&sql);
    for id in order_ids {
        query = query.bind(id);
    }
    let items = query.fetch_all(&mut *conn).await?;
    Ok(items)
}

/// One item, only if it belongs to the given order
pub async fn find_in_order<'e, E: SqliteExecutor<'e>>(
    executor: E,
    order_id: i64,
    item_id: i64,
) -> RepoResult<Option<OrderItem>> {
    let item = sqlx::query_as("SELECT * FROM order_item WHERE id = ? AND order_id = ?")
        .bind(item_id)
        .bind(order_id)
        .fetch_optional(executor)
        .await?;
    Ok(item)
}

pub async fn insert<'e, E: SqliteExecutor<'e>>(executor: E, item: &OrderItem) -> RepoResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_item (id, order_id, product_id, quantity, unit_price, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(item.id)
    .bind(item.order_id)
    .bind(item.product_id)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(item.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn delete<'e, E: SqliteExecutor<'e>>(executor: E, item_id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM order_item WHERE id = ?")
        .bind(item_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Lower the quantity, only if it still holds the value the caller checked against
pub async fn update_quantity<'e, E: SqliteExecutor<'e>>(
    executor: E,
    item_id: i64,
    current: i32,
    quantity: i32,
) -> RepoResult<bool> {
    let result = sqlx::query("UPDATE order_item SET quantity = ? WHERE id = ? AND quantity = ?")
        .bind(quantity)
        .bind(item_id)
        .bind(current)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn count_by_order<'e, E: SqliteExecutor<'e>>(executor: E, order_id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_item WHERE order_id = ?")
        .bind(order_id)
        .fetch_one(executor)
        .await?;
    Ok(count)
}
