//! Order Repository

use shared::models::{Order, OrderQuery, OrderStatus};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor};

use super::RepoResult;

/// Upper bound of one admin page
pub const MAX_PAGE_SIZE: u32 = 100;

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: i64,
) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(order)
}

/// Open orders of a table, newest first
pub async fn find_open_by_table<'e, E: SqliteExecutor<'e>>(
    executor: E,
    table_id: i64,
) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as(
        r#"
        SELECT * FROM orders
        WHERE table_id = ? AND status IN ('in_progress', 'ready')
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(table_id)
    .fetch_all(executor)
    .await?;
    Ok(orders)
}

pub async fn count_open_by_table<'e, E: SqliteExecutor<'e>>(
    executor: E,
    table_id: i64,
) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM orders WHERE table_id = ? AND status IN ('in_progress', 'ready')",
    )
    .bind(table_id)
    .fetch_one(executor)
    .await?;
    Ok(count)
}

pub async fn insert<'e, E: SqliteExecutor<'e>>(executor: E, order: &Order) -> RepoResult<()> {
    sqlx::query(
        r#"
        INSERT INTO orders (
            id, restaurant_id, table_id, table_number, order_number, order_day,
            order_total, status, source, member_id, completed_by, completed_at,
            cancellation_reason, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(order.id)
    .bind(order.restaurant_id)
    .bind(order.table_id)
    .bind(order.table_number)
    .bind(&order.order_number)
    .bind(&order.order_day)
    .bind(order.order_total)
    .bind(order.status)
    .bind(order.source)
    .bind(order.member_id)
    .bind(order.completed_by)
    .bind(order.completed_at)
    .bind(&order.cancellation_reason)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn update_total<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: i64,
    total: f64,
) -> RepoResult<()> {
    sqlx::query("UPDATE orders SET order_total = ?, updated_at = ? WHERE id = ?")
        .bind(total)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// in_progress → ready. Returns false when the order was not in progress.
pub async fn mark_ready<'e, E: SqliteExecutor<'e>>(executor: E, id: i64) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE orders SET status = 'ready', updated_at = ? WHERE id = ? AND status = 'in_progress'",
    )
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Complete one order if it is still open
pub async fn complete_if_open<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: i64,
    completed_by: Option<i64>,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let result = sqlx::query(
        r#"
        UPDATE orders
        SET status = 'completed', completed_by = ?, completed_at = ?, updated_at = ?
        WHERE id = ? AND status IN ('in_progress', 'ready')
        "#,
    )
    .bind(completed_by)
    .bind(now)
    .bind(now)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Complete every open order of a table in one statement
pub async fn complete_open_by_table<'e, E: SqliteExecutor<'e>>(
    executor: E,
    table_id: i64,
    completed_by: Option<i64>,
) -> RepoResult<u64> {
    let now = shared::util::now_millis();
    let result = sqlx::query(
        r#"
        UPDATE orders
        SET status = 'completed', completed_by = ?, completed_at = ?, updated_at = ?
        WHERE table_id = ? AND status IN ('in_progress', 'ready')
        "#,
    )
    .bind(completed_by)
    .bind(now)
    .bind(now)
    .bind(table_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Hard-delete every open order of a table together with its items
pub async fn delete_open_by_table(conn: &mut SqliteConnection, table_id: i64) -> RepoResult<u64> {
    sqlx::query(
        r#"
        DELETE FROM order_item WHERE order_id IN (
            SELECT id FROM orders WHERE table_id = ? AND status IN ('in_progress', 'ready')
        )
        "#,
    )
    .bind(table_id)
    .execute(&mut *conn)
    .await?;

    let result =
        sqlx::query("DELETE FROM orders WHERE table_id = ? AND status IN ('in_progress', 'ready')")
            .bind(table_id)
            .execute(&mut *conn)
            .await?;
    Ok(result.rows_affected())
}

/// Kitchen queue: in-progress first, then ready, each oldest first
pub async fn list_kitchen<'e, E: SqliteExecutor<'e>>(
    executor: E,
    restaurant_id: i64,
) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as(
        r#"
        SELECT * FROM orders
        WHERE restaurant_id = ? AND status IN ('in_progress', 'ready')
        ORDER BY CASE status WHEN 'in_progress' THEN 0 ELSE 1 END, created_at, id
        "#,
    )
    .bind(restaurant_id)
    .fetch_all(executor)
    .await?;
    Ok(orders)
}

/// Open orders of a restaurant, newest first
pub async fn list_open_by_restaurant<'e, E: SqliteExecutor<'e>>(
    executor: E,
    restaurant_id: i64,
) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as(
        r#"
        SELECT * FROM orders
        WHERE restaurant_id = ? AND status IN ('in_progress', 'ready')
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(restaurant_id)
    .fetch_all(executor)
    .await?;
    Ok(orders)
}

fn push_filters<'a>(qb: &mut QueryBuilder<'a, Sqlite>, restaurant_id: i64, query: &'a OrderQuery) {
    qb.push(" WHERE restaurant_id = ").push_bind(restaurant_id);
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(table_number) = query.table_number {
        qb.push(" AND table_number = ").push_bind(table_number);
    }
    if let Some(start) = query.start_date.as_deref() {
        qb.push(" AND order_day >= ").push_bind(start);
    }
    if let Some(end) = query.end_date.as_deref() {
        qb.push(" AND order_day <= ").push_bind(end);
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        qb.push(" AND order_number LIKE ")
            .push_bind(format!("%{}%", search.trim()));
    }
}

/// Filtered, paginated order list, newest first. Returns the page and the total match count.
pub async fn search(
    conn: &mut SqliteConnection,
    restaurant_id: i64,
    query: &OrderQuery,
) -> RepoResult<(Vec<Order>, i64)> {
    let limit = query.limit.clamp(1, MAX_PAGE_SIZE) as i64;
    let offset = (query.page.max(1) as i64 - 1) * limit;

    let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM orders");
    push_filters(&mut count_qb, restaurant_id, query);
    let total: i64 = count_qb
        .build_query_scalar()
        .fetch_one(&mut *conn)
        .await?;

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM orders");
    push_filters(&mut qb, restaurant_id, query);
    qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    let orders: Vec<Order> = qb.build_query_as().fetch_all(&mut *conn).await?;

    Ok((orders, total))
}

/// Current status of an order, used to explain a lost conditional update
pub async fn status_of<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: i64,
) -> RepoResult<Option<OrderStatus>> {
    let status = sqlx::query_scalar("SELECT status FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(status)
}
