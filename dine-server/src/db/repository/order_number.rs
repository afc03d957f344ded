//! Order Number Ledger Repository
//!
//! One row per number handed out. Rows outlive the orders they were
//! claimed for, so the per-day count only ever grows.

use sqlx::SqliteExecutor;

use super::RepoResult;

pub async fn count_for_day<'e, E: SqliteExecutor<'e>>(
    executor: E,
    restaurant_id: i64,
    order_day: &str,
) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM order_number_ledger WHERE restaurant_id = ? AND order_day = ?",
    )
    .bind(restaurant_id)
    .bind(order_day)
    .fetch_one(executor)
    .await?;
    Ok(count)
}

/// Insert the number. A taken number surfaces as `RepoError::Duplicate`.
pub async fn claim<'e, E: SqliteExecutor<'e>>(
    executor: E,
    restaurant_id: i64,
    order_day: &str,
    order_number: &str,
) -> RepoResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_number_ledger (restaurant_id, order_day, order_number, claimed_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(restaurant_id)
    .bind(order_day)
    .bind(order_number)
    .bind(shared::util::now_millis())
    .execute(executor)
    .await?;
    Ok(())
}
