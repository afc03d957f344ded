//! 集成测试公共工具
//!
//! Builds the full HTTP router on a private in-memory database and drives it
//! with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use dine_server::db::DbService;
use dine_server::{Config, ServerState};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use shared::models::MemberRole;
use tower::ServiceExt;

pub const RESTAURANT: i64 = 1;

pub struct TestApp {
    pub state: ServerState,
    pub router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = DbService::in_memory().await.unwrap();
        let state = ServerState::with_db(Config::for_tests(), db);
        let router = dine_server::api::router(state.clone());
        Self { state, router }
    }

    pub fn token(&self, role: MemberRole) -> String {
        self.token_for(RESTAURANT, role)
    }

    pub fn token_for(&self, restaurant_id: i64, role: MemberRole) -> String {
        self.state
            .jwt()
            .generate_token(100, restaurant_id, role)
            .unwrap()
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.send_from(method, uri, token, body, "203.0.113.1").await
    }

    /// Same as [`send`](Self::send) with an explicit client address
    pub async fn send_from(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
        client_ip: &str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", client_ip);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Owner creates a table through the admin API, returns its id
    pub async fn table(&self, table_number: i32) -> i64 {
        let owner = self.token(MemberRole::Owner);
        let (status, body) = self
            .send(
                Method::POST,
                "/api/admin/tables",
                Some(&owner),
                Some(json!({ "table_number": table_number, "capacity": 4 })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_i64().unwrap()
    }

    /// Owner creates a product, returns its id
    pub async fn product(&self, name: &str, price: f64) -> i64 {
        let owner = self.token(MemberRole::Owner);
        let (status, body) = self
            .send(
                Method::POST,
                "/api/admin/products",
                Some(&owner),
                Some(json!({ "name": name, "price": price })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_i64().unwrap()
    }

    /// Customer submits a cart by QR code
    pub async fn qr_order(&self, table_id: i64, items: Value) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            &format!("/api/qr/tables/{table_id}/orders"),
            None,
            Some(json!({ "items": items })),
        )
        .await
    }
}

pub fn line(product_id: i64, quantity: i32, unit_price: f64) -> Value {
    json!({ "product_id": product_id, "quantity": quantity, "unit_price": unit_price })
}
