use super::*;
use crate::auth::CurrentUser;
use crate::catalog::SqliteCatalog;
use crate::db::DbService;
use crate::db::repository::product;
use crate::orders::sequence::{NumberLedger, SequenceConfig, SqliteLedger};
use crate::realtime::PublishError;
use crate::tables::SqliteTableCoordinator;
use async_trait::async_trait;
use shared::models::{DiningTableCreate, MemberRole, Product, ProductCreate};
use std::sync::Mutex;
use std::time::Duration;

const RESTAURANT: i64 = 1;

// ========================================================================
// Publishers
// ========================================================================

#[derive(Default)]
struct RecordingPublisher {
    events: Mutex<Vec<(Room, RealtimeEvent, Value)>>,
}

impl RecordingPublisher {
    fn in_room(&self, room: Room) -> Vec<(RealtimeEvent, Value)> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _, _)| *r == room)
            .map(|(_, e, v)| (*e, v.clone()))
            .collect()
    }

    fn count(&self, room: Room, event: RealtimeEvent) -> usize {
        self.in_room(room).iter().filter(|(e, _)| *e == event).count()
    }

    fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, room: Room, event: RealtimeEvent, payload: Value) -> Result<(), PublishError> {
        self.events.lock().unwrap().push((room, event, payload));
        Ok(())
    }
}

struct FailingPublisher;

#[async_trait]
impl EventPublisher for FailingPublisher {
    async fn publish(&self, _: Room, _: RealtimeEvent, _: Value) -> Result<(), PublishError> {
        Err(PublishError::Closed)
    }
}

// ========================================================================
// Environment
// ========================================================================

struct TestEnv {
    db: DbService,
    manager: OrderManager,
    events: Arc<RecordingPublisher>,
    table: DiningTable,
    p1: Product,
    p2: Product,
}

fn fast_sequence(ledger: Arc<dyn NumberLedger>) -> SequenceGenerator {
    SequenceGenerator::new(
        ledger,
        SequenceConfig {
            max_attempts: 20,
            backoff: Duration::from_millis(1),
        },
    )
}

fn build_manager(
    db: &DbService,
    publisher: Arc<dyn EventPublisher>,
    ledger: Arc<dyn NumberLedger>,
) -> OrderManager {
    OrderManager::new(
        db.pool.clone(),
        Arc::new(SqliteTableCoordinator::new(db.pool.clone())),
        Arc::new(SqliteCatalog::new(db.pool.clone())),
        publisher,
        fast_sequence(ledger),
        chrono_tz::UTC,
    )
}

async fn create_table(db: &DbService, restaurant_id: i64, table_number: i32) -> DiningTable {
    dining_table::create(
        &db.pool,
        restaurant_id,
        &DiningTableCreate {
            table_number,
            capacity: Some(4),
            location: None,
        },
    )
    .await
    .unwrap()
}

async fn create_product(db: &DbService, restaurant_id: i64, name: &str, price: f64) -> Product {
    product::create(
        &db.pool,
        restaurant_id,
        &ProductCreate {
            name: name.to_string(),
            price,
            image: None,
        },
    )
    .await
    .unwrap()
}

async fn env_on(db: DbService) -> TestEnv {
    let events = Arc::new(RecordingPublisher::default());
    let ledger = Arc::new(SqliteLedger::new(db.pool.clone()));
    let manager = build_manager(&db, events.clone(), ledger);
    let table = create_table(&db, RESTAURANT, 1).await;
    let p1 = create_product(&db, RESTAURANT, "Burger", 10.0).await;
    let p2 = create_product(&db, RESTAURANT, "Wine", 30.0).await;
    TestEnv {
        db,
        manager,
        events,
        table,
        p1,
        p2,
    }
}

async fn setup() -> TestEnv {
    env_on(DbService::in_memory().await.unwrap()).await
}

/// File-backed database with a real connection pool
async fn setup_file() -> (TestEnv, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("dine.db").display());
    let db = DbService::new(&url).await.unwrap();
    (env_on(db).await, dir)
}

// ========================================================================
// Actors and carts
// ========================================================================

fn member(role: MemberRole, restaurant_id: i64) -> Actor {
    Actor::Member(CurrentUser {
        member_id: 100,
        restaurant_id,
        role,
    })
}

fn staff() -> Actor {
    member(MemberRole::Staff, RESTAURANT)
}

fn chef() -> Actor {
    member(MemberRole::Chef, RESTAURANT)
}

fn owner() -> Actor {
    member(MemberRole::Owner, RESTAURANT)
}

fn customer() -> Actor {
    Actor::Anonymous
}

fn line(product: &Product, quantity: i32) -> OrderItemInput {
    OrderItemInput {
        product_id: product.id,
        quantity,
        unit_price: product.price,
    }
}

fn cart(items: Vec<OrderItemInput>) -> OrderCreate {
    OrderCreate { items }
}

impl TestEnv {
    async fn order(&self, items: Vec<OrderItemInput>) -> OrderCreated {
        self.manager
            .create_order(&customer(), self.table.id, cart(items))
            .await
            .unwrap()
    }

    async fn table_status(&self) -> TableStatus {
        dining_table::find_by_id(&self.db.pool, self.table.id)
            .await
            .unwrap()
            .unwrap()
            .status
    }

    async fn stored(&self, order_id: i64) -> Option<Order> {
        order::find_by_id(&self.db.pool, order_id).await.unwrap()
    }
}

mod test_core;
mod test_rules;
