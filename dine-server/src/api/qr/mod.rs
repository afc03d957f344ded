//! 扫码点餐 API - 匿名访问
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/qr/tables/{table_id}/orders | POST | 提交购物车 (限流) |
//! | /api/qr/tables/by-code/{qr_code} | GET | 扫码查桌 |
//! | /api/qr/orders/{order_id} | GET | 订单跟踪 |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::rate_limit::qr_order_rate_limit;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/qr", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    let ordering = Router::new()
        .route("/tables/{table_id}/orders", post(handler::create_order))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            qr_order_rate_limit,
        ));

    Router::new()
        .route("/tables/by-code/{qr_code}", get(handler::table_by_code))
        .route("/orders/{order_id}", get(handler::get_order))
        .merge(ordering)
}
