//! 店主管理 API - OWNER
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/admin/orders | GET | 历史订单 (筛选 + 分页) |
//! | /api/admin/orders/{id} | GET | 订单详情 |
//! | /api/admin/tables | POST | 新建桌台 |
//! | /api/admin/products | POST | 新建商品 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/orders", get(handler::list_orders))
        .route("/orders/{id}", get(handler::get_order))
        .route("/tables", post(handler::create_table))
        .route("/products", post(handler::create_product))
}
