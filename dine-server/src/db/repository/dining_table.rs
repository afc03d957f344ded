//! Dining Table Repository

use shared::models::{DiningTable, DiningTableCreate, TableStatus};
use sqlx::SqliteExecutor;

use super::{RepoError, RepoResult};

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: i64,
) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as("SELECT * FROM dining_table WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(table)
}

pub async fn find_by_number<'e, E: SqliteExecutor<'e>>(
    executor: E,
    restaurant_id: i64,
    table_number: i32,
) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as(
        "SELECT * FROM dining_table WHERE restaurant_id = ? AND table_number = ?",
    )
    .bind(restaurant_id)
    .bind(table_number)
    .fetch_optional(executor)
    .await?;
    Ok(table)
}

pub async fn find_by_qr<'e, E: SqliteExecutor<'e>>(
    executor: E,
    qr_code: &str,
) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as("SELECT * FROM dining_table WHERE qr_code = ?")
        .bind(qr_code)
        .fetch_optional(executor)
        .await?;
    Ok(table)
}

/// All tables of a restaurant, by table number
pub async fn find_all<'e, E: SqliteExecutor<'e>>(
    executor: E,
    restaurant_id: i64,
) -> RepoResult<Vec<DiningTable>> {
    let tables = sqlx::query_as(
        "SELECT * FROM dining_table WHERE restaurant_id = ? ORDER BY table_number",
    )
    .bind(restaurant_id)
    .fetch_all(executor)
    .await?;
    Ok(tables)
}

pub async fn create<'e, E: SqliteExecutor<'e>>(
    executor: E,
    restaurant_id: i64,
    data: &DiningTableCreate,
) -> RepoResult<DiningTable> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let qr_code = format!("QR-{restaurant_id}-{}-{now}", data.table_number);

    let table = sqlx::query_as(
        r#"
        INSERT INTO dining_table (
            id, restaurant_id, table_number, status, is_paused, qr_code,
            capacity, location, order_version, created_at, updated_at
        )
        VALUES (?, ?, ?, 'available', 0, ?, ?, ?, 0, ?, ?)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(data.table_number)
    .bind(&qr_code)
    .bind(data.capacity)
    .bind(&data.location)
    .bind(now)
    .bind(now)
    .fetch_one(executor)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => RepoError::Duplicate(format!(
            "Table {} already exists",
            data.table_number
        )),
        _ => RepoError::from(e),
    })?;
    Ok(table)
}

/// Claim the next version of the table's open-order set.
///
/// Returns false when another writer got there first.
pub async fn bump_version<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: i64,
    expected_version: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE dining_table
        SET order_version = order_version + 1, updated_at = ?
        WHERE id = ? AND order_version = ? AND is_paused = 0
        "#,
    )
    .bind(shared::util::now_millis())
    .bind(id)
    .bind(expected_version)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Unconditional version bump, serializes the writer against `bump_version`
pub async fn touch_version<'e, E: SqliteExecutor<'e>>(executor: E, id: i64) -> RepoResult<()> {
    sqlx::query(
        "UPDATE dining_table SET order_version = order_version + 1, updated_at = ? WHERE id = ?",
    )
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn set_status<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: i64,
    status: TableStatus,
    is_paused: bool,
) -> RepoResult<()> {
    let result = sqlx::query(
        "UPDATE dining_table SET status = ?, is_paused = ?, updated_at = ? WHERE id = ?",
    )
    .bind(status)
    .bind(is_paused)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(executor)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Table {id} not found")));
    }
    Ok(())
}
