use async_trait::async_trait;
use shared::models::{DiningTable, Order, TableStatus, TableStatusChange};
use sqlx::{SqliteConnection, SqlitePool};

use super::{TableError, TableResult};
use crate::db::repository::{dining_table, order};

/// Read and write access to table occupancy
#[async_trait]
pub trait TableCoordinator: Send + Sync {
    /// Table of a restaurant. Tables of other restaurants are not found.
    async fn table(&self, restaurant_id: Option<i64>, table_id: i64) -> TableResult<DiningTable>;

    async fn status(&self, table_id: i64) -> TableResult<TableStatus>;

    /// Open orders of a table, newest first
    async fn open_orders(&self, table_id: i64) -> TableResult<Vec<Order>>;

    /// Staff status update. Only `paused` can be set; `available` on a paused
    /// table lifts the pause and the status is re-derived from its orders.
    async fn update_status(
        &self,
        restaurant_id: i64,
        table_id: i64,
        requested: TableStatus,
    ) -> TableResult<Option<TableStatusChange>>;

    /// Re-derive the status after the open-order set changed, inside the
    /// caller's transaction.
    async fn reconcile(
        &self,
        conn: &mut SqliteConnection,
        table_id: i64,
        order_id: Option<i64>,
    ) -> TableResult<Option<TableStatusChange>>;
}

/// Coordinator over the `dining_table` and `orders` tables
#[derive(Clone, Debug)]
pub struct SqliteTableCoordinator {
    pool: SqlitePool,
}

impl SqliteTableCoordinator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn scoped(table: Option<DiningTable>, restaurant_id: Option<i64>, table_id: i64) -> TableResult<DiningTable> {
    match table {
        Some(t) if restaurant_id.is_none_or(|r| r == t.restaurant_id) => Ok(t),
        _ => Err(TableError::NotFound(table_id)),
    }
}

#[async_trait]
impl TableCoordinator for SqliteTableCoordinator {
    async fn table(&self, restaurant_id: Option<i64>, table_id: i64) -> TableResult<DiningTable> {
        let table = dining_table::find_by_id(&self.pool, table_id).await?;
        scoped(table, restaurant_id, table_id)
    }

    async fn status(&self, table_id: i64) -> TableResult<TableStatus> {
        let table = self.table(None, table_id).await?;
        Ok(table.status)
    }

    async fn open_orders(&self, table_id: i64) -> TableResult<Vec<Order>> {
        Ok(order::find_open_by_table(&self.pool, table_id).await?)
    }

    async fn update_status(
        &self,
        restaurant_id: i64,
        table_id: i64,
        requested: TableStatus,
    ) -> TableResult<Option<TableStatusChange>> {
        let mut tx = self.pool.begin().await?;
        // Write first so the transaction holds the write lock before it reads;
        // in-flight order creations on this table must re-read
        dining_table::touch_version(&mut *tx, table_id).await?;
        let table = scoped(
            dining_table::find_by_id(&mut *tx, table_id).await?,
            Some(restaurant_id),
            table_id,
        )?;

        let is_paused = match (requested, table.is_paused) {
            (TableStatus::Paused, _) => true,
            (TableStatus::Available, true) => false,
            (requested, _) => return Err(TableError::StatusLocked { requested }),
        };

        let open = order::count_open_by_table(&mut *tx, table_id).await?;
        let status = TableStatus::derive(is_paused, open);
        dining_table::set_status(&mut *tx, table_id, status, is_paused).await?;
        tx.commit().await?;

        tracing::info!(
            table_id = %table_id,
            previous = %table.status,
            status = %status,
            "Table status updated by staff"
        );

        Ok((status != table.status).then(|| TableStatusChange {
            table_id,
            restaurant_id: table.restaurant_id,
            table_number: table.table_number,
            previous: table.status,
            status,
            order_id: None,
        }))
    }

    async fn reconcile(
        &self,
        conn: &mut SqliteConnection,
        table_id: i64,
        order_id: Option<i64>,
    ) -> TableResult<Option<TableStatusChange>> {
        let table = dining_table::find_by_id(&mut *conn, table_id)
            .await?
            .ok_or(TableError::NotFound(table_id))?;
        let open = order::count_open_by_table(&mut *conn, table_id).await?;
        let status = TableStatus::derive(table.is_paused, open);
        if status == table.status {
            return Ok(None);
        }

        dining_table::set_status(&mut *conn, table_id, status, table.is_paused).await?;
        tracing::debug!(table_id = %table_id, previous = %table.status, status = %status, "Table occupancy reconciled");

        Ok(Some(TableStatusChange {
            table_id,
            restaurant_id: table.restaurant_id,
            table_number: table.table_number,
            previous: table.status,
            status,
            order_id,
        }))
    }
}
