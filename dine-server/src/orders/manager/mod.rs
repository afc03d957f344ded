//! OrderManager - dine-in order lifecycle
//!
//! ```text
//! request ─▶ OrderManager ─┬─▶ TableCoordinator (table, occupancy)
//!                          ├─▶ SequenceGenerator (ORD-n)
//!                          ├─▶ SQLite transaction
//!                          └─▶ EventPublisher (after commit)
//! ```
//!
//! Every write that touches the open orders of a table (or their items)
//! bumps `dining_table.order_version` as its first statement. Order creation
//! reads the version together with the open orders and only commits if the
//! version is still the one it read; otherwise it recomputes the delta.

mod error;

#[cfg(test)]
mod tests;

pub use error::{ManagerError, ManagerResult};

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono_tz::Tz;
use serde_json::{Value, json};
use shared::models::{
    DiningTable, Order, OrderCreate, OrderCreated, OrderDetail, OrderItem, OrderItemInput,
    OrderItemView, OrderPage, OrderQuery, OrderSource, OrderStatus, TableSettlement, TableStatus,
    TableStatusChange,
};
use shared::realtime::{RealtimeEvent, Room};
use sqlx::SqlitePool;

use super::money;
use super::sequence::SequenceGenerator;
use crate::auth::Actor;
use crate::catalog::ProductCatalog;
use crate::db::repository::{RepoError, dining_table, order, order_item};
use crate::realtime::EventPublisher;
use crate::tables::{TableCoordinator, TableError};
use crate::utils::time;

/// Read/compute/write rounds before a create gives up on a busy table
const MAX_CREATE_ATTEMPTS: u32 = 5;

/// Quantity per product still missing from the table's open orders
fn compute_delta(requested: &[OrderItemInput], present: &[OrderItem]) -> Vec<OrderItemInput> {
    let mut on_table: HashMap<i64, i64> = HashMap::new();
    for item in present {
        *on_table.entry(item.product_id).or_default() += item.quantity as i64;
    }

    // Cart lines for the same product are summed, first price wins
    let mut wanted: BTreeMap<i64, (i64, f64, usize)> = BTreeMap::new();
    for (position, line) in requested.iter().enumerate() {
        let entry = wanted
            .entry(line.product_id)
            .or_insert((0, line.unit_price, position));
        entry.0 += line.quantity as i64;
    }

    let mut delta: Vec<(usize, OrderItemInput)> = wanted
        .into_iter()
        .filter_map(|(product_id, (quantity, unit_price, position))| {
            let missing = quantity - on_table.get(&product_id).copied().unwrap_or(0);
            (missing > 0).then(|| {
                (
                    position,
                    OrderItemInput {
                        product_id,
                        quantity: missing as i32,
                        unit_price,
                    },
                )
            })
        })
        .collect();
    // keep the cart's order
    delta.sort_by_key(|(position, _)| *position);
    delta.into_iter().map(|(_, line)| line).collect()
}

/// Dine-in order lifecycle manager
pub struct OrderManager {
    pool: SqlitePool,
    tables: Arc<dyn TableCoordinator>,
    catalog: Arc<dyn ProductCatalog>,
    publisher: Arc<dyn EventPublisher>,
    sequence: SequenceGenerator,
    timezone: Tz,
}

impl std::fmt::Debug for OrderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderManager")
            .field("sequence", &self.sequence)
            .field("timezone", &self.timezone)
            .finish_non_exhaustive()
    }
}

impl OrderManager {
    pub fn new(
        pool: SqlitePool,
        tables: Arc<dyn TableCoordinator>,
        catalog: Arc<dyn ProductCatalog>,
        publisher: Arc<dyn EventPublisher>,
        sequence: SequenceGenerator,
        timezone: Tz,
    ) -> Self {
        Self {
            pool,
            tables,
            catalog,
            publisher,
            sequence,
            timezone,
        }
    }

    // ========== Lookups ==========

    async fn table_for(&self, restaurant_id: Option<i64>, table_id: i64) -> ManagerResult<DiningTable> {
        self.tables
            .table(restaurant_id, table_id)
            .await
            .map_err(|e| match e {
                TableError::NotFound(id) => ManagerError::TableNotFound(id),
                other => other.into(),
            })
    }

    /// Order visible to a restaurant. `None` scope is the anonymous customer view.
    async fn order_for(&self, restaurant_id: Option<i64>, order_id: i64) -> ManagerResult<Order> {
        match order::find_by_id(&self.pool, order_id).await? {
            Some(o) if restaurant_id.is_none_or(|r| r == o.restaurant_id) => Ok(o),
            _ => Err(ManagerError::OrderNotFound(order_id)),
        }
    }

    /// Attach items and product projections
    async fn details(&self, orders: Vec<Order>) -> ManagerResult<Vec<OrderDetail>> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        let items = {
            let mut conn = self.pool.acquire().await?;
            order_item::find_by_orders(&mut conn, &ids).await?
        };

        let mut by_restaurant: HashMap<i64, HashSet<i64>> = HashMap::new();
        for o in &orders {
            by_restaurant.entry(o.restaurant_id).or_default();
        }
        let restaurant_of: HashMap<i64, i64> =
            orders.iter().map(|o| (o.id, o.restaurant_id)).collect();
        for item in &items {
            if let Some(r) = restaurant_of.get(&item.order_id) {
                by_restaurant.entry(*r).or_default().insert(item.product_id);
            }
        }
        let mut projections = HashMap::new();
        for (restaurant_id, product_ids) in by_restaurant {
            let product_ids: Vec<i64> = product_ids.into_iter().collect();
            let found = self.catalog.lookup(restaurant_id, &product_ids).await?;
            projections.insert(restaurant_id, found);
        }

        let mut items_by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
        for item in items {
            items_by_order.entry(item.order_id).or_default().push(item);
        }

        Ok(orders
            .into_iter()
            .map(|mut o| {
                let items = items_by_order.remove(&o.id).unwrap_or_default();
                o.order_total = money::order_total(&items);
                let catalog = projections.get(&o.restaurant_id);
                let items = items
                    .into_iter()
                    .map(|item| OrderItemView {
                        id: item.id,
                        product_id: item.product_id,
                        quantity: item.quantity,
                        unit_price: item.unit_price,
                        line_total: money::to_f64(money::line_total(item.quantity, item.unit_price)),
                        product: catalog.and_then(|c| c.get(&item.product_id)).cloned(),
                    })
                    .collect();
                OrderDetail { order: o, items }
            })
            .collect())
    }

    async fn detail(&self, o: Order) -> ManagerResult<OrderDetail> {
        let id = o.id;
        self.details(vec![o])
            .await?
            .pop()
            .ok_or(ManagerError::OrderNotFound(id))
    }

    // ========== Events ==========

    async fn emit(&self, room: Room, event: RealtimeEvent, payload: &Value) {
        if let Err(e) = self.publisher.publish(room, event, payload.clone()).await {
            tracing::warn!(room = %room, event = %event, error = %e, "Failed to publish realtime event");
        }
    }

    async fn emit_table_change(&self, change: Option<TableStatusChange>) {
        let Some(change) = change else {
            return;
        };
        let payload = serde_json::to_value(&change).unwrap_or_default();
        self.emit(Room::Table(change.table_id), RealtimeEvent::TableStatusChanged, &payload)
            .await;
        self.emit(
            Room::Service(change.restaurant_id),
            RealtimeEvent::TableStatusChanged,
            &payload,
        )
        .await;
        self.emit(
            Room::Restaurant(change.restaurant_id),
            RealtimeEvent::TableStatusChanged,
            &payload,
        )
        .await;
    }

    // ========== Create ==========

    /// Create an order from the table's cumulative cart.
    ///
    /// Only the quantities not yet on the table's open orders are ordered.
    /// When nothing is missing the most recent open order is returned with
    /// `created = false`.
    pub async fn create_order(
        &self,
        actor: &Actor,
        table_id: i64,
        input: OrderCreate,
    ) -> ManagerResult<OrderCreated> {
        let (source, scope, member_id) = match actor {
            Actor::Anonymous => (OrderSource::QrOrder, None, None),
            Actor::Member(user) if user.role.is_service() => {
                (OrderSource::Staff, Some(user.restaurant_id), Some(user.member_id))
            }
            Actor::Member(_) => return Err(ManagerError::Forbidden("place orders")),
        };
        for line in &input.items {
            money::validate_line(line)?;
        }

        let table = self.table_for(scope, table_id).await?;
        if table.is_paused {
            return Err(ManagerError::TablePaused(table_id));
        }
        let restaurant_id = table.restaurant_id;

        let product_ids: Vec<i64> = input.items.iter().map(|l| l.product_id).collect();
        let known = self.catalog.lookup(restaurant_id, &product_ids).await?;
        if let Some(missing) = product_ids.iter().find(|id| !known.contains_key(id)) {
            return Err(ManagerError::ProductNotFound(*missing));
        }

        let order_day = time::business_day(self.timezone);
        let mut order_number: Option<String> = None;

        for attempt in 0..MAX_CREATE_ATTEMPTS {
            let (table, open, present) = {
                let mut conn = self.pool.acquire().await?;
                let table = dining_table::find_by_id(&mut *conn, table_id)
                    .await?
                    .ok_or(ManagerError::TableNotFound(table_id))?;
                let open = order::find_open_by_table(&mut *conn, table_id).await?;
                let ids: Vec<i64> = open.iter().map(|o| o.id).collect();
                let present = order_item::find_by_orders(&mut conn, &ids).await?;
                (table, open, present)
            };
            if table.is_paused {
                return Err(ManagerError::TablePaused(table_id));
            }

            let delta = compute_delta(&input.items, &present);
            if delta.is_empty() {
                let Some(latest) = open.into_iter().next() else {
                    return Err(ManagerError::EmptyCart);
                };
                tracing::debug!(table_id = %table_id, order_id = %latest.id, "Cart already on the table, nothing to create");
                return Ok(OrderCreated {
                    created: false,
                    order: self.detail(latest).await?,
                });
            }

            let number = match &order_number {
                Some(n) => n.clone(),
                None => {
                    let n = self.sequence.next_number(restaurant_id, &order_day).await;
                    order_number = Some(n.clone());
                    n
                }
            };

            let now = shared::util::now_millis();
            let order_id = shared::util::snowflake_id();
            let items: Vec<OrderItem> = delta
                .iter()
                .map(|line| OrderItem {
                    id: shared::util::snowflake_id(),
                    order_id,
                    product_id: line.product_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    created_at: now,
                })
                .collect();
            let new_order = Order {
                id: order_id,
                restaurant_id,
                table_id,
                table_number: table.table_number,
                order_number: number,
                order_day: order_day.clone(),
                order_total: money::order_total(&items),
                status: OrderStatus::InProgress,
                source,
                member_id,
                completed_by: None,
                completed_at: None,
                cancellation_reason: None,
                created_at: now,
                updated_at: now,
            };

            let mut tx = self.pool.begin().await?;
            if !dining_table::bump_version(&mut *tx, table_id, table.order_version).await? {
                tx.rollback().await?;
                tracing::debug!(table_id = %table_id, attempt = attempt + 1, "Open orders changed underneath, recomputing");
                continue;
            }
            match order::insert(&mut *tx, &new_order).await {
                Ok(()) => {}
                Err(RepoError::Duplicate(_)) => {
                    tx.rollback().await?;
                    tracing::warn!(
                        table_id = %table_id,
                        order_number = %new_order.order_number,
                        "Order number already taken, drawing a new one"
                    );
                    order_number = None;
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
            for item in &items {
                order_item::insert(&mut *tx, item).await?;
            }
            let change = self
                .tables
                .reconcile(&mut tx, table_id, Some(order_id))
                .await?;
            tx.commit().await?;

            tracing::info!(
                order_id = %order_id,
                order_number = %new_order.order_number,
                table_id = %table_id,
                total = new_order.order_total,
                "Order created"
            );

            let detail = self.detail(new_order).await?;
            let payload = serde_json::to_value(&detail).unwrap_or_default();
            self.emit(Room::Kitchen(restaurant_id), RealtimeEvent::OrderNew, &payload)
                .await;
            self.emit(Room::Service(restaurant_id), RealtimeEvent::OrderNew, &payload)
                .await;
            self.emit_table_change(change).await;

            return Ok(OrderCreated {
                created: true,
                order: detail,
            });
        }

        tracing::warn!(table_id = %table_id, "Order creation gave up after repeated version conflicts");
        Err(ManagerError::TableBusy(table_id))
    }

    // ========== Transitions ==========

    /// in_progress → ready
    pub async fn mark_ready(&self, actor: &Actor, order_id: i64) -> ManagerResult<OrderDetail> {
        let chef = actor
            .kitchen()
            .ok_or(ManagerError::Forbidden("mark orders ready"))?;
        let current = self.order_for(Some(chef.restaurant_id), order_id).await?;

        if !order::mark_ready(&self.pool, order_id).await? {
            let from = order::status_of(&self.pool, order_id)
                .await?
                .unwrap_or(current.status);
            return Err(ManagerError::InvalidTransition {
                order_id,
                from,
                to: OrderStatus::Ready,
            });
        }

        let updated = self.order_for(None, order_id).await?;
        tracing::info!(order_id = %order_id, order_number = %updated.order_number, "Order ready");

        let detail = self.detail(updated).await?;
        let restaurant_id = detail.order.restaurant_id;
        let status = json!({
            "order_id": order_id,
            "order_number": detail.order.order_number,
            "table_id": detail.order.table_id,
            "table_number": detail.order.table_number,
            "previous": OrderStatus::InProgress,
            "status": OrderStatus::Ready,
        });
        let full = serde_json::to_value(&detail).unwrap_or_default();
        self.emit(Room::Order(order_id), RealtimeEvent::OrderStatusChanged, &status)
            .await;
        self.emit(Room::Service(restaurant_id), RealtimeEvent::OrderReady, &full)
            .await;
        self.emit(Room::Service(restaurant_id), RealtimeEvent::OrderNeedsAttention, &status)
            .await;
        self.emit(Room::Kitchen(restaurant_id), RealtimeEvent::OrderStatusChanged, &status)
            .await;

        Ok(detail)
    }

    /// Complete one open order; frees the table when it was the last one
    pub async fn complete_order(&self, actor: &Actor, order_id: i64) -> ManagerResult<OrderDetail> {
        let staff = actor
            .service()
            .ok_or(ManagerError::Forbidden("complete orders"))?;
        let current = self.order_for(Some(staff.restaurant_id), order_id).await?;

        let mut tx = self.pool.begin().await?;
        dining_table::touch_version(&mut *tx, current.table_id).await?;
        if !order::complete_if_open(&mut *tx, order_id, Some(staff.member_id)).await? {
            let from = order::status_of(&mut *tx, order_id)
                .await?
                .unwrap_or(current.status);
            tx.rollback().await?;
            return Err(ManagerError::InvalidTransition {
                order_id,
                from,
                to: OrderStatus::Completed,
            });
        }
        let change = self
            .tables
            .reconcile(&mut tx, current.table_id, Some(order_id))
            .await?;
        tx.commit().await?;

        tracing::info!(order_id = %order_id, completed_by = %staff.member_id, "Order completed");

        let detail = self.detail(self.order_for(None, order_id).await?).await?;
        let payload = json!({
            "order_id": order_id,
            "order_number": detail.order.order_number,
            "table_id": detail.order.table_id,
            "table_number": detail.order.table_number,
            "previous": current.status,
            "status": OrderStatus::Completed,
        });
        let restaurant_id = detail.order.restaurant_id;
        self.emit(Room::Order(order_id), RealtimeEvent::OrderStatusChanged, &payload)
            .await;
        self.emit(Room::Service(restaurant_id), RealtimeEvent::OrderStatusChanged, &payload)
            .await;
        self.emit(Room::Kitchen(restaurant_id), RealtimeEvent::OrderStatusChanged, &payload)
            .await;
        self.emit_table_change(change).await;

        Ok(detail)
    }

    /// Complete every open order of a table as one batch
    pub async fn complete_table(&self, actor: &Actor, table_id: i64) -> ManagerResult<TableSettlement> {
        let staff = actor
            .service()
            .ok_or(ManagerError::Forbidden("complete tables"))?;
        let table = self.table_for(Some(staff.restaurant_id), table_id).await?;
        self.settle_table(&table, staff.member_id).await
    }

    /// Complete the whole table an order sits on
    pub async fn complete_table_of_order(
        &self,
        actor: &Actor,
        order_id: i64,
    ) -> ManagerResult<TableSettlement> {
        let staff = actor
            .service()
            .ok_or(ManagerError::Forbidden("complete tables"))?;
        let current = self.order_for(Some(staff.restaurant_id), order_id).await?;
        let table = self.table_for(Some(staff.restaurant_id), current.table_id).await?;
        self.settle_table(&table, staff.member_id).await
    }

    async fn settle_table(&self, table: &DiningTable, member_id: i64) -> ManagerResult<TableSettlement> {
        let table_id = table.id;
        let mut tx = self.pool.begin().await?;
        dining_table::touch_version(&mut *tx, table_id).await?;
        let open = order::find_open_by_table(&mut *tx, table_id).await?;
        if open.is_empty() {
            tx.rollback().await?;
            return Err(ManagerError::NoOpenOrders(table_id));
        }
        let ids: Vec<i64> = open.iter().map(|o| o.id).collect();
        let items = order_item::find_by_orders(&mut tx, &ids).await?;
        order::complete_open_by_table(&mut *tx, table_id, Some(member_id)).await?;
        let change = self.tables.reconcile(&mut tx, table_id, None).await?;
        tx.commit().await?;

        let settlement = TableSettlement {
            table_id,
            table_number: table.table_number,
            order_ids: ids,
            order_numbers: open.iter().map(|o| o.order_number.clone()).collect(),
            total: money::order_total(&items),
        };
        tracing::info!(
            table_id = %table_id,
            orders = settlement.order_ids.len(),
            total = settlement.total,
            completed_by = %member_id,
            "Table completed"
        );

        let payload = json!({
            "table_id": table_id,
            "table_number": table.table_number,
            "order_ids": settlement.order_ids,
            "order_numbers": settlement.order_numbers,
            "status": OrderStatus::Completed,
            "total": settlement.total,
            "completed_by": member_id,
        });
        self.emit(Room::Service(table.restaurant_id), RealtimeEvent::OrderStatusChanged, &payload)
            .await;
        self.emit(Room::Kitchen(table.restaurant_id), RealtimeEvent::OrderStatusChanged, &payload)
            .await;
        self.emit(Room::Table(table_id), RealtimeEvent::OrderStatusChanged, &payload)
            .await;
        self.emit_table_change(change).await;

        Ok(settlement)
    }

    /// Hard-delete every open order of a table with its items
    pub async fn cancel_table(
        &self,
        actor: &Actor,
        table_id: i64,
        reason: Option<String>,
    ) -> ManagerResult<TableSettlement> {
        let staff = actor
            .service()
            .ok_or(ManagerError::Forbidden("cancel orders"))?;
        let table = self.table_for(Some(staff.restaurant_id), table_id).await?;
        self.discard_table(&table, staff.member_id, reason).await
    }

    /// Cancel the whole table an order sits on
    pub async fn cancel_table_of_order(
        &self,
        actor: &Actor,
        order_id: i64,
        reason: Option<String>,
    ) -> ManagerResult<TableSettlement> {
        let staff = actor
            .service()
            .ok_or(ManagerError::Forbidden("cancel orders"))?;
        let current = self.order_for(Some(staff.restaurant_id), order_id).await?;
        let table = self.table_for(Some(staff.restaurant_id), current.table_id).await?;
        self.discard_table(&table, staff.member_id, reason).await
    }

    async fn discard_table(
        &self,
        table: &DiningTable,
        member_id: i64,
        reason: Option<String>,
    ) -> ManagerResult<TableSettlement> {
        let table_id = table.id;
        let mut tx = self.pool.begin().await?;
        dining_table::touch_version(&mut *tx, table_id).await?;
        let open = order::find_open_by_table(&mut *tx, table_id).await?;
        if open.is_empty() {
            tx.rollback().await?;
            return Err(ManagerError::NoOpenOrders(table_id));
        }
        let ids: Vec<i64> = open.iter().map(|o| o.id).collect();
        let items = order_item::find_by_orders(&mut tx, &ids).await?;
        order::delete_open_by_table(&mut tx, table_id).await?;
        let change = self.tables.reconcile(&mut tx, table_id, None).await?;
        tx.commit().await?;

        let settlement = TableSettlement {
            table_id,
            table_number: table.table_number,
            order_ids: ids,
            order_numbers: open.iter().map(|o| o.order_number.clone()).collect(),
            total: money::order_total(&items),
        };
        tracing::warn!(
            table_id = %table_id,
            orders = settlement.order_ids.len(),
            cancelled_by = %member_id,
            reason = reason.as_deref().unwrap_or(""),
            "Table orders cancelled and deleted"
        );

        let payload = json!({
            "table_id": table_id,
            "table_number": table.table_number,
            "order_ids": settlement.order_ids,
            "order_numbers": settlement.order_numbers,
            "reason": reason,
            "cancelled_by": member_id,
            "deleted": true,
        });
        self.emit(Room::Service(table.restaurant_id), RealtimeEvent::OrderCancelled, &payload)
            .await;
        self.emit(Room::Kitchen(table.restaurant_id), RealtimeEvent::OrderCancelled, &payload)
            .await;
        self.emit(Room::Table(table_id), RealtimeEvent::OrderCancelled, &payload)
            .await;
        self.emit_table_change(change).await;

        Ok(settlement)
    }

    // ========== Items ==========

    /// Checks shared by the item corrections, run inside the write transaction
    async fn modifiable(
        &self,
        conn: &mut sqlx::SqliteConnection,
        order_id: i64,
        table_id: i64,
    ) -> ManagerResult<Order> {
        let current = order::find_by_id(&mut *conn, order_id)
            .await?
            .ok_or(ManagerError::OrderNotFound(order_id))?;
        if !current.status.is_open() {
            return Err(ManagerError::OrderNotModifiable {
                order_id,
                status: current.status,
            });
        }
        let table = dining_table::find_by_id(&mut *conn, table_id)
            .await?
            .ok_or(ManagerError::TableNotFound(table_id))?;
        if table.is_paused {
            return Err(ManagerError::TablePaused(table_id));
        }
        Ok(current)
    }

    /// Remove a line. Removing the last line completes the order.
    pub async fn delete_item(
        &self,
        actor: &Actor,
        order_id: i64,
        item_id: i64,
    ) -> ManagerResult<OrderDetail> {
        let staff = actor
            .service()
            .ok_or(ManagerError::Forbidden("modify orders"))?;
        let before = self.order_for(Some(staff.restaurant_id), order_id).await?;

        let mut tx = self.pool.begin().await?;
        dining_table::touch_version(&mut *tx, before.table_id).await?;
        let current = match self.modifiable(&mut tx, order_id, before.table_id).await {
            Ok(o) => o,
            Err(e) => {
                tx.rollback().await?;
                return Err(e);
            }
        };
        if order_item::find_in_order(&mut *tx, order_id, item_id).await?.is_none() {
            tx.rollback().await?;
            return Err(ManagerError::OrderItemNotFound { order_id, item_id });
        }

        order_item::delete(&mut *tx, item_id).await?;
        let remaining = order_item::find_by_order(&mut *tx, order_id).await?;
        order::update_total(&mut *tx, order_id, money::order_total(&remaining)).await?;

        let mut change = None;
        let auto_completed = remaining.is_empty();
        if auto_completed {
            order::complete_if_open(&mut *tx, order_id, Some(staff.member_id)).await?;
            change = self
                .tables
                .reconcile(&mut tx, current.table_id, Some(order_id))
                .await?;
        }
        tx.commit().await?;

        tracing::info!(
            order_id = %order_id,
            item_id = %item_id,
            auto_completed,
            "Order item deleted"
        );

        let detail = self.detail(self.order_for(None, order_id).await?).await?;
        let restaurant_id = detail.order.restaurant_id;
        let payload = json!({
            "order_id": order_id,
            "order_number": detail.order.order_number,
            "table_id": detail.order.table_id,
            "table_number": detail.order.table_number,
            "removed_item_id": item_id,
            "status": detail.order.status,
            "order_total": detail.order.order_total,
            "items": detail.items,
        });
        self.emit(Room::Kitchen(restaurant_id), RealtimeEvent::OrderItemsModified, &payload)
            .await;
        self.emit(Room::Service(restaurant_id), RealtimeEvent::OrderItemsModified, &payload)
            .await;
        self.emit(Room::Order(order_id), RealtimeEvent::OrderItemsModified, &payload)
            .await;
        if auto_completed {
            let status = json!({
                "order_id": order_id,
                "order_number": detail.order.order_number,
                "table_id": detail.order.table_id,
                "table_number": detail.order.table_number,
                "previous": current.status,
                "status": OrderStatus::Completed,
            });
            self.emit(Room::Order(order_id), RealtimeEvent::OrderStatusChanged, &status)
                .await;
            self.emit(Room::Kitchen(restaurant_id), RealtimeEvent::OrderStatusChanged, &status)
                .await;
        }
        self.emit_table_change(change).await;

        Ok(detail)
    }

    /// Lower a line's quantity. Only strict decreases down to 1 are allowed.
    pub async fn reduce_item(
        &self,
        actor: &Actor,
        order_id: i64,
        item_id: i64,
        quantity: i32,
    ) -> ManagerResult<OrderDetail> {
        let staff = actor
            .service()
            .ok_or(ManagerError::Forbidden("modify orders"))?;
        let before = self.order_for(Some(staff.restaurant_id), order_id).await?;

        let mut tx = self.pool.begin().await?;
        dining_table::touch_version(&mut *tx, before.table_id).await?;
        if let Err(e) = self.modifiable(&mut tx, order_id, before.table_id).await {
            tx.rollback().await?;
            return Err(e);
        }
        let Some(item) = order_item::find_in_order(&mut *tx, order_id, item_id).await? else {
            tx.rollback().await?;
            return Err(ManagerError::OrderItemNotFound { order_id, item_id });
        };
        if quantity <= 0 || quantity >= item.quantity {
            tx.rollback().await?;
            return Err(ManagerError::InvalidQuantity {
                current: item.quantity,
                requested: quantity,
            });
        }

        order_item::update_quantity(&mut *tx, item_id, item.quantity, quantity).await?;
        let items = order_item::find_by_order(&mut *tx, order_id).await?;
        order::update_total(&mut *tx, order_id, money::order_total(&items)).await?;
        tx.commit().await?;

        tracing::info!(
            order_id = %order_id,
            item_id = %item_id,
            from = item.quantity,
            to = quantity,
            "Order item reduced"
        );

        let detail = self.detail(self.order_for(None, order_id).await?).await?;
        let restaurant_id = detail.order.restaurant_id;
        let payload = json!({
            "order_id": order_id,
            "order_number": detail.order.order_number,
            "table_id": detail.order.table_id,
            "table_number": detail.order.table_number,
            "item_id": item_id,
            "product_id": item.product_id,
            "previous_quantity": item.quantity,
            "quantity": quantity,
            "order_total": detail.order.order_total,
        });
        self.emit(Room::Kitchen(restaurant_id), RealtimeEvent::OrderItemReduced, &payload)
            .await;
        self.emit(Room::Service(restaurant_id), RealtimeEvent::OrderItemReduced, &payload)
            .await;
        self.emit(Room::Order(order_id), RealtimeEvent::OrderItemReduced, &payload)
            .await;

        Ok(detail)
    }

    // ========== Tables ==========

    /// Staff pause / unpause
    pub async fn set_table_status(
        &self,
        actor: &Actor,
        table_id: i64,
        status: TableStatus,
    ) -> ManagerResult<DiningTable> {
        let staff = actor
            .service()
            .ok_or(ManagerError::Forbidden("change table status"))?;
        let change = self
            .tables
            .update_status(staff.restaurant_id, table_id, status)
            .await
            .map_err(|e| match e {
                TableError::NotFound(id) => ManagerError::TableNotFound(id),
                other => other.into(),
            })?;
        self.emit_table_change(change).await;
        self.table_for(Some(staff.restaurant_id), table_id).await
    }

    // ========== Reads ==========

    /// Kitchen queue: in-progress first, then ready, each oldest first
    pub async fn kitchen_queue(&self, actor: &Actor) -> ManagerResult<Vec<OrderDetail>> {
        let chef = actor
            .kitchen()
            .ok_or(ManagerError::Forbidden("view the kitchen queue"))?;
        let orders = order::list_kitchen(&self.pool, chef.restaurant_id).await?;
        self.details(orders).await
    }

    /// Open orders of the restaurant, newest first
    pub async fn service_orders(&self, actor: &Actor) -> ManagerResult<Vec<OrderDetail>> {
        let staff = actor
            .service()
            .ok_or(ManagerError::Forbidden("view service orders"))?;
        let orders = order::list_open_by_restaurant(&self.pool, staff.restaurant_id).await?;
        self.details(orders).await
    }

    /// Open orders of one table with items
    pub async fn table_orders(&self, actor: &Actor, table_id: i64) -> ManagerResult<Vec<OrderDetail>> {
        let staff = actor
            .service()
            .ok_or(ManagerError::Forbidden("view table orders"))?;
        self.table_for(Some(staff.restaurant_id), table_id).await?;
        let orders = self.tables.open_orders(table_id).await?;
        self.details(orders).await
    }

    /// Single order. Customers may track any order by id; members only
    /// see their own restaurant's.
    pub async fn order_detail(&self, actor: &Actor, order_id: i64) -> ManagerResult<OrderDetail> {
        let scope = actor.member().map(|u| u.restaurant_id);
        let o = self.order_for(scope, order_id).await?;
        self.detail(o).await
    }

    /// Owner order detail
    pub async fn admin_order(&self, actor: &Actor, order_id: i64) -> ManagerResult<OrderDetail> {
        let owner = actor
            .owner()
            .ok_or(ManagerError::Forbidden("view order history"))?;
        let o = self.order_for(Some(owner.restaurant_id), order_id).await?;
        self.detail(o).await
    }

    /// Owner order history with filters and pagination
    pub async fn search_orders(&self, actor: &Actor, mut query: OrderQuery) -> ManagerResult<OrderPage> {
        let owner = actor
            .owner()
            .ok_or(ManagerError::Forbidden("view order history"))?;
        query.start_date = time::normalize_day(query.start_date.as_deref())
            .map_err(|e| ManagerError::InvalidItem(e.message))?;
        query.end_date = time::normalize_day(query.end_date.as_deref())
            .map_err(|e| ManagerError::InvalidItem(e.message))?;
        query.page = query.page.max(1);
        query.limit = query.limit.clamp(1, order::MAX_PAGE_SIZE);

        let (orders, total) = {
            let mut conn = self.pool.acquire().await?;
            order::search(&mut conn, owner.restaurant_id, &query).await?
        };
        Ok(OrderPage {
            orders: self.details(orders).await?,
            total,
            page: query.page,
            limit: query.limit,
        })
    }
}
