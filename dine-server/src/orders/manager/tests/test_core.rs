use super::*;

#[tokio::test]
async fn test_first_order_of_the_day() {
    let env = setup().await;
    assert_eq!(env.table_status().await, TableStatus::Available);

    let result = env.order(vec![line(&env.p1, 2)]).await;

    assert!(result.created);
    let order = &result.order.order;
    assert_eq!(order.order_number, "ORD-1");
    assert_eq!(order.order_total, 20.0);
    assert_eq!(order.status, OrderStatus::InProgress);
    assert_eq!(order.source, OrderSource::QrOrder);
    assert_eq!(order.table_number, 1);
    assert_eq!(result.order.items.len(), 1);
    assert_eq!(result.order.items[0].line_total, 20.0);
    assert_eq!(
        result.order.items[0].product.as_ref().map(|p| p.name.as_str()),
        Some("Burger")
    );
    assert_eq!(env.table_status().await, TableStatus::Occupied);
}

#[tokio::test]
async fn test_same_cart_twice_creates_nothing() {
    let env = setup().await;
    let first = env.order(vec![line(&env.p1, 2)]).await;

    let second = env.order(vec![line(&env.p1, 2)]).await;

    assert!(!second.created);
    assert_eq!(second.order.order.id, first.order.order.id);
    assert_eq!(second.order.order.order_total, 20.0);
    let open = order::find_open_by_table(&env.db.pool, env.table.id).await.unwrap();
    assert_eq!(open.len(), 1);
}

#[tokio::test]
async fn test_cumulative_cart_orders_only_the_delta() {
    let env = setup().await;
    env.order(vec![line(&env.p1, 2)]).await;

    let result = env.order(vec![line(&env.p1, 3), line(&env.p2, 1)]).await;

    assert!(result.created);
    assert_eq!(result.order.order.order_number, "ORD-2");
    let items: Vec<(i64, i32)> = result
        .order
        .items
        .iter()
        .map(|i| (i.product_id, i.quantity))
        .collect();
    assert_eq!(items, vec![(env.p1.id, 1), (env.p2.id, 1)]);
    assert_eq!(result.order.order.order_total, 40.0);
}

#[tokio::test]
async fn test_reduce_is_a_strict_decrease() {
    let env = setup().await;
    let created = env.order(vec![line(&env.p1, 5)]).await;
    let order_id = created.order.order.id;
    let item_id = created.order.items[0].id;

    let reduced = env
        .manager
        .reduce_item(&staff(), order_id, item_id, 3)
        .await
        .unwrap();
    assert_eq!(reduced.items[0].quantity, 3);
    assert_eq!(reduced.order.order_total, 30.0);
    assert_eq!(env.stored(order_id).await.unwrap().order_total, 30.0);

    let err = env
        .manager
        .reduce_item(&staff(), order_id, item_id, 4)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ManagerError::InvalidQuantity { current: 3, requested: 4 }
    ));

    // same value is not a decrease either
    assert!(matches!(
        env.manager.reduce_item(&staff(), order_id, item_id, 3).await,
        Err(ManagerError::InvalidQuantity { .. })
    ));
    assert!(matches!(
        env.manager.reduce_item(&staff(), order_id, item_id, 0).await,
        Err(ManagerError::InvalidQuantity { .. })
    ));
}

#[tokio::test]
async fn test_complete_table_settles_every_open_order() {
    let env = setup().await;
    let first = env.order(vec![line(&env.p1, 2)]).await;
    let second = env.order(vec![line(&env.p1, 2), line(&env.p2, 1)]).await;
    assert!(second.created);
    env.events.clear();

    let settlement = env.manager.complete_table(&staff(), env.table.id).await.unwrap();

    assert_eq!(settlement.total, 50.0);
    assert_eq!(settlement.order_ids.len(), 2);
    for id in [first.order.order.id, second.order.order.id] {
        let stored = env.stored(id).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Completed);
        assert_eq!(stored.completed_by, Some(100));
        assert!(stored.completed_at.is_some());
    }
    assert_eq!(env.table_status().await, TableStatus::Available);
    assert_eq!(
        env.events
            .count(Room::Service(RESTAURANT), RealtimeEvent::OrderStatusChanged),
        1
    );
    assert_eq!(
        env.events
            .count(Room::Table(env.table.id), RealtimeEvent::TableStatusChanged),
        1
    );
}

#[tokio::test]
async fn test_mark_ready_on_completed_order_is_rejected() {
    let env = setup().await;
    let created = env.order(vec![line(&env.p1, 1)]).await;
    let order_id = created.order.order.id;
    env.manager.complete_table(&staff(), env.table.id).await.unwrap();

    let err = env.manager.mark_ready(&chef(), order_id).await.unwrap_err();

    assert!(matches!(
        err,
        ManagerError::InvalidTransition {
            from: OrderStatus::Completed,
            to: OrderStatus::Ready,
            ..
        }
    ));
    assert_eq!(env.stored(order_id).await.unwrap().status, OrderStatus::Completed);
}

#[tokio::test]
async fn test_mark_ready_notifies_every_audience() {
    let env = setup().await;
    let created = env.order(vec![line(&env.p1, 1)]).await;
    let order_id = created.order.order.id;
    env.events.clear();

    let detail = env.manager.mark_ready(&chef(), order_id).await.unwrap();
    assert_eq!(detail.order.status, OrderStatus::Ready);

    assert_eq!(env.events.count(Room::Order(order_id), RealtimeEvent::OrderStatusChanged), 1);
    assert_eq!(env.events.count(Room::Service(RESTAURANT), RealtimeEvent::OrderReady), 1);
    assert_eq!(
        env.events.count(Room::Service(RESTAURANT), RealtimeEvent::OrderNeedsAttention),
        1
    );
    assert_eq!(env.events.count(Room::Kitchen(RESTAURANT), RealtimeEvent::OrderStatusChanged), 1);

    // ready twice loses
    assert!(matches!(
        env.manager.mark_ready(&chef(), order_id).await,
        Err(ManagerError::InvalidTransition { from: OrderStatus::Ready, .. })
    ));
}

#[tokio::test]
async fn test_new_order_event_reaches_kitchen_and_service() {
    let env = setup().await;
    let created = env.order(vec![line(&env.p1, 2)]).await;

    let kitchen = env.events.in_room(Room::Kitchen(RESTAURANT));
    assert_eq!(kitchen.len(), 1);
    assert_eq!(kitchen[0].0, RealtimeEvent::OrderNew);
    assert_eq!(kitchen[0].1["order_number"], "ORD-1");
    assert_eq!(kitchen[0].1["table_number"], 1);
    assert_eq!(kitchen[0].1["status"], "in_progress");
    assert_eq!(kitchen[0].1["items"][0]["quantity"], 2);
    assert_eq!(env.events.count(Room::Service(RESTAURANT), RealtimeEvent::OrderNew), 1);

    let table_events = env.events.in_room(Room::Table(env.table.id));
    assert_eq!(table_events.len(), 1);
    assert_eq!(table_events[0].1["status"], "occupied");
    assert_eq!(table_events[0].1["order_id"], created.order.order.id);

    // second order on an occupied table changes no occupancy
    env.order(vec![line(&env.p1, 3)]).await;
    assert_eq!(env.events.in_room(Room::Table(env.table.id)).len(), 1);
}
