//! 点餐全流程 HTTP 测试
//!
//! QR 下单 → 厨房出餐 → 前厅结账/取消, 通过完整路由驱动。

mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, line};
use serde_json::json;
use shared::models::MemberRole;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_qr_order_created_then_repeated() {
    let app = TestApp::new().await;
    let table_id = app.table(1).await;
    let burger = app.product("Burger", 10.0).await;

    let (status, body) = app.qr_order(table_id, json!([line(burger, 2, 10.0)])).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["created"], true);
    assert_eq!(body["data"]["order"]["order_number"], "ORD-1");
    assert_eq!(body["data"]["order"]["order_total"], 20.0);
    let order_id = body["data"]["order"]["id"].as_i64().unwrap();

    // Same cumulative cart again: nothing new to cook
    let (status, body) = app.qr_order(table_id, json!([line(burger, 2, 10.0)])).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["created"], false);

    let (status, body) = app
        .send(Method::GET, &format!("/api/qr/orders/{order_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "in_progress");
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_qr_empty_cart_is_bad_request() {
    let app = TestApp::new().await;
    let table_id = app.table(1).await;

    let (status, body) = app.qr_order(table_id, json!([])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4007);
}

#[tokio::test]
async fn test_qr_order_is_rate_limited_per_ip() {
    let app = TestApp::new().await;
    let table_id = app.table(1).await;
    let burger = app.product("Burger", 10.0).await;
    let uri = format!("/api/qr/tables/{table_id}/orders");
    let cart = json!({ "items": [line(burger, 1, 10.0)] });

    for _ in 0..5 {
        let (status, _) = app
            .send_from(Method::POST, &uri, None, Some(cart.clone()), "198.51.100.7")
            .await;
        assert!(status.is_success());
    }
    let (status, body) = app
        .send_from(Method::POST, &uri, None, Some(cart.clone()), "198.51.100.7")
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], 9);

    // Another client is unaffected
    let (status, _) = app
        .send_from(Method::POST, &uri, None, Some(cart), "198.51.100.8")
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_staff_endpoints_require_token() {
    let app = TestApp::new().await;
    let (status, body) = app.send(Method::GET, "/api/service/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1001);

    let (status, _) = app
        .send(Method::GET, "/api/kitchen/orders", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_kitchen_flow_and_roles() {
    let app = TestApp::new().await;
    let table_id = app.table(3).await;
    let soup = app.product("Soup", 6.5).await;
    let (_, body) = app.qr_order(table_id, json!([line(soup, 2, 6.5)])).await;
    let order_id = body["data"]["order"]["id"].as_i64().unwrap();

    let chef = app.token(MemberRole::Chef);
    let staff = app.token(MemberRole::Staff);

    let (status, body) = app
        .send(Method::GET, "/api/kitchen/orders", Some(&chef), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let ready_uri = format!("/api/kitchen/orders/{order_id}/ready");
    let (status, body) = app.send(Method::POST, &ready_uri, Some(&staff), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2002);

    let (status, body) = app.send(Method::POST, &ready_uri, Some(&chef), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "ready");

    // Ready orders stay visible until the table is settled
    let (_, body) = app
        .send(Method::GET, "/api/kitchen/orders", Some(&chef), None)
        .await;
    assert_eq!(body["data"][0]["status"], "ready");

    let (status, body) = app.send(Method::POST, &ready_uri, Some(&chef), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 4008);
}

#[tokio::test]
async fn test_service_reduce_then_complete_table() {
    let app = TestApp::new().await;
    let table_id = app.table(5).await;
    let burger = app.product("Burger", 10.0).await;
    let wine = app.product("Wine", 30.0).await;
    let (_, body) = app
        .qr_order(table_id, json!([line(burger, 3, 10.0), line(wine, 1, 30.0)]))
        .await;
    let order = &body["data"]["order"];
    let order_id = order["id"].as_i64().unwrap();
    let burger_item = order["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["product_id"] == burger)
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    let staff = app.token(MemberRole::Staff);
    let item_uri = format!("/api/service/orders/{order_id}/items/{burger_item}");

    let (status, body) = app
        .send(Method::PATCH, &item_uri, Some(&staff), Some(json!({ "quantity": 5 })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["current"], 3);

    let (status, body) = app
        .send(Method::PATCH, &item_uri, Some(&staff), Some(json!({ "quantity": 1 })))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["order_total"], 40.0);

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/service/tables/{table_id}/complete"),
            Some(&staff),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["total"], 40.0);
    assert_eq!(body["data"]["order_ids"], json!([order_id]));

    let (_, body) = app
        .send(Method::GET, &format!("/api/tables/{table_id}"), Some(&staff), None)
        .await;
    assert_eq!(body["data"]["status"], "available");

    // Nothing left to settle
    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/service/tables/{table_id}/complete"),
            Some(&staff),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 7003);
}

#[tokio::test]
async fn test_service_cancel_by_order_id_with_reason() {
    let app = TestApp::new().await;
    let table_id = app.table(8).await;
    let tea = app.product("Tea", 3.0).await;
    let (_, body) = app.qr_order(table_id, json!([line(tea, 1, 3.0)])).await;
    let order_id = body["data"]["order"]["id"].as_i64().unwrap();

    let staff = app.token(MemberRole::Staff);
    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/service/orders/{order_id}/cancel"),
            Some(&staff),
            Some(json!({ "reason": "guest left" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["order_numbers"], json!(["ORD-1"]));

    let (status, _) = app
        .send(Method::GET, &format!("/api/qr/orders/{order_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Numbers keep counting after a cancellation
    let (_, body) = app.qr_order(table_id, json!([line(tea, 1, 3.0)])).await;
    assert_eq!(body["data"]["order"]["order_number"], "ORD-2");
}

#[tokio::test]
async fn test_paused_table_rejects_qr_orders() {
    let app = TestApp::new().await;
    let table_id = app.table(2).await;
    let tea = app.product("Tea", 3.0).await;
    let staff = app.token(MemberRole::Staff);
    let status_uri = format!("/api/service/tables/{table_id}/status");

    let (status, body) = app
        .send(Method::PUT, &status_uri, Some(&staff), Some(json!({ "status": "paused" })))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "paused");

    let (status, body) = app.qr_order(table_id, json!([line(tea, 1, 3.0)])).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 7005);

    let (status, body) = app
        .send(Method::PUT, &status_uri, Some(&staff), Some(json!({ "status": "occupied" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 7007);

    let (status, _) = app
        .send(Method::PUT, &status_uri, Some(&staff), Some(json!({ "status": "available" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.qr_order(table_id, json!([line(tea, 1, 3.0)])).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_qr_order_ignores_member_in_body() {
    let app = TestApp::new().await;
    let table_id = app.table(4).await;
    let tea = app.product("Tea", 3.0).await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/qr/tables/{table_id}/orders"),
            None,
            Some(json!({ "items": [line(tea, 1, 3.0)], "member_id": 77 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert!(body["data"]["order"]["member_id"].is_null());
}
