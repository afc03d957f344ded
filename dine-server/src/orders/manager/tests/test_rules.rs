use super::*;

#[tokio::test]
async fn test_paused_table_rejects_orders() {
    let env = setup().await;
    env.manager
        .set_table_status(&staff(), env.table.id, TableStatus::Paused)
        .await
        .unwrap();

    let err = env
        .manager
        .create_order(&customer(), env.table.id, cart(vec![line(&env.p1, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::TablePaused(_)));

    env.manager
        .set_table_status(&staff(), env.table.id, TableStatus::Available)
        .await
        .unwrap();
    assert!(env.order(vec![line(&env.p1, 1)]).await.created);
}

#[tokio::test]
async fn test_paused_table_blocks_item_changes_but_not_settlement() {
    let env = setup().await;
    let created = env.order(vec![line(&env.p1, 3)]).await;
    let order_id = created.order.order.id;
    let item_id = created.order.items[0].id;

    let table = env
        .manager
        .set_table_status(&staff(), env.table.id, TableStatus::Paused)
        .await
        .unwrap();
    assert_eq!(table.status, TableStatus::Paused);

    assert!(matches!(
        env.manager.reduce_item(&staff(), order_id, item_id, 1).await,
        Err(ManagerError::TablePaused(_))
    ));
    assert!(matches!(
        env.manager.delete_item(&staff(), order_id, item_id).await,
        Err(ManagerError::TablePaused(_))
    ));

    env.manager.complete_table(&staff(), env.table.id).await.unwrap();
    assert_eq!(env.table_status().await, TableStatus::Paused);

    // lifting the pause re-derives the status from the orders
    let table = env
        .manager
        .set_table_status(&staff(), env.table.id, TableStatus::Available)
        .await
        .unwrap();
    assert_eq!(table.status, TableStatus::Available);
}

#[tokio::test]
async fn test_unpause_with_open_orders_is_occupied() {
    let env = setup().await;
    env.order(vec![line(&env.p1, 1)]).await;
    env.manager
        .set_table_status(&staff(), env.table.id, TableStatus::Paused)
        .await
        .unwrap();

    let table = env
        .manager
        .set_table_status(&staff(), env.table.id, TableStatus::Available)
        .await
        .unwrap();
    assert_eq!(table.status, TableStatus::Occupied);
}

#[tokio::test]
async fn test_staff_cannot_set_occupancy() {
    let env = setup().await;
    let err = env
        .manager
        .set_table_status(&staff(), env.table.id, TableStatus::Occupied)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ManagerError::Table(crate::tables::TableError::StatusLocked { .. })
    ));
}

#[tokio::test]
async fn test_roles_are_checked_before_lookup() {
    let env = setup().await;

    // the ids do not exist; the caller still only learns about its role
    assert!(matches!(
        env.manager.mark_ready(&staff(), 999).await,
        Err(ManagerError::Forbidden(_))
    ));
    assert!(matches!(
        env.manager.complete_table(&chef(), 999).await,
        Err(ManagerError::Forbidden(_))
    ));
    assert!(matches!(
        env.manager.cancel_table(&customer(), 999, None).await,
        Err(ManagerError::Forbidden(_))
    ));
    assert!(matches!(
        env.manager
            .create_order(&chef(), env.table.id, cart(vec![line(&env.p1, 1)]))
            .await,
        Err(ManagerError::Forbidden(_))
    ));
    assert!(matches!(
        env.manager.kitchen_queue(&staff()).await,
        Err(ManagerError::Forbidden(_))
    ));
    assert!(matches!(
        env.manager.search_orders(&staff(), OrderQuery::default()).await,
        Err(ManagerError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_other_restaurant_sees_not_found() {
    let env = setup().await;
    let created = env.order(vec![line(&env.p1, 1)]).await;
    let order_id = created.order.order.id;
    let foreign_staff = member(MemberRole::Staff, 2);
    let foreign_chef = member(MemberRole::Chef, 2);

    assert!(matches!(
        env.manager.complete_table(&foreign_staff, env.table.id).await,
        Err(ManagerError::TableNotFound(_))
    ));
    assert!(matches!(
        env.manager.mark_ready(&foreign_chef, order_id).await,
        Err(ManagerError::OrderNotFound(_))
    ));
    assert!(matches!(
        env.manager.order_detail(&foreign_staff, order_id).await,
        Err(ManagerError::OrderNotFound(_))
    ));
    assert!(matches!(
        env.manager
            .create_order(&foreign_staff, env.table.id, cart(vec![line(&env.p1, 1)]))
            .await,
        Err(ManagerError::TableNotFound(_))
    ));
    // a customer may still track the order by id
    assert!(env.manager.order_detail(&customer(), order_id).await.is_ok());
}

#[tokio::test]
async fn test_empty_cart_without_open_orders() {
    let env = setup().await;
    assert!(matches!(
        env.manager
            .create_order(&customer(), env.table.id, cart(vec![]))
            .await,
        Err(ManagerError::EmptyCart)
    ));
    assert_eq!(env.table_status().await, TableStatus::Available);
}

#[tokio::test]
async fn test_invalid_lines_are_rejected() {
    let env = setup().await;
    assert!(matches!(
        env.manager
            .create_order(&customer(), env.table.id, cart(vec![line(&env.p1, 0)]))
            .await,
        Err(ManagerError::InvalidItem(_))
    ));

    let mut negative = line(&env.p1, 1);
    negative.unit_price = -2.0;
    assert!(matches!(
        env.manager
            .create_order(&customer(), env.table.id, cart(vec![negative]))
            .await,
        Err(ManagerError::InvalidPrice { .. })
    ));

    let foreign = create_product(&env.db, 2, "Elsewhere", 1.0).await;
    assert!(matches!(
        env.manager
            .create_order(&customer(), env.table.id, cart(vec![line(&foreign, 1)]))
            .await,
        Err(ManagerError::ProductNotFound(id)) if id == foreign.id
    ));
    assert!(matches!(
        env.manager
            .create_order(&customer(), 424242, cart(vec![line(&env.p1, 1)]))
            .await,
        Err(ManagerError::TableNotFound(424242))
    ));
}

#[tokio::test]
async fn test_terminal_orders_stay_terminal() {
    let env = setup().await;
    let created = env.order(vec![line(&env.p1, 3)]).await;
    let order_id = created.order.order.id;
    let item_id = created.order.items[0].id;
    env.manager.complete_order(&staff(), order_id).await.unwrap();

    assert!(matches!(
        env.manager.reduce_item(&staff(), order_id, item_id, 1).await,
        Err(ManagerError::OrderNotModifiable { status: OrderStatus::Completed, .. })
    ));
    assert!(matches!(
        env.manager.delete_item(&staff(), order_id, item_id).await,
        Err(ManagerError::OrderNotModifiable { .. })
    ));
    assert!(matches!(
        env.manager.complete_order(&staff(), order_id).await,
        Err(ManagerError::InvalidTransition { from: OrderStatus::Completed, .. })
    ));
    assert!(matches!(
        env.manager.complete_table(&staff(), env.table.id).await,
        Err(ManagerError::NoOpenOrders(_))
    ));
    assert!(matches!(
        env.manager.cancel_table(&staff(), env.table.id, None).await,
        Err(ManagerError::NoOpenOrders(_))
    ));
    assert_eq!(env.stored(order_id).await.unwrap().status, OrderStatus::Completed);
}

#[tokio::test]
async fn test_publish_failure_does_not_fail_the_write() {
    let db = DbService::in_memory().await.unwrap();
    let manager = build_manager(
        &db,
        Arc::new(FailingPublisher),
        Arc::new(SqliteLedger::new(db.pool.clone())),
    );
    let table = create_table(&db, RESTAURANT, 9).await;
    let p = create_product(&db, RESTAURANT, "Tea", 2.5).await;

    let created = manager
        .create_order(&customer(), table.id, cart(vec![line(&p, 2)]))
        .await
        .unwrap();
    assert!(created.created);
    assert_eq!(created.order.order.order_total, 5.0);
    manager.complete_table(&staff(), table.id).await.unwrap();
}

#[tokio::test]
async fn test_order_member_comes_from_the_caller() {
    let env = setup().await;
    let qr = env.order(vec![line(&env.p1, 1)]).await;
    assert_eq!(qr.order.order.member_id, None);
    assert_eq!(qr.order.order.source, OrderSource::QrOrder);

    let entered = env
        .manager
        .create_order(&staff(), env.table.id, cart(vec![line(&env.p1, 2)]))
        .await
        .unwrap();
    assert_eq!(entered.order.order.member_id, Some(100));
    assert_eq!(entered.order.order.source, OrderSource::Staff);
}
