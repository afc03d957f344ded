//! QR Ordering Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{DiningTable, OrderCreate, OrderCreated, OrderDetail};

use crate::auth::Actor;
use crate::core::ServerState;
use crate::db::repository::dining_table;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

/// POST /api/qr/tables/{table_id}/orders - 提交购物车
///
/// 201 when a new order was created, 200 when the cart was already on the table.
pub async fn create_order(
    State(state): State<ServerState>,
    Path(table_id): Path<i64>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderCreated>>)> {
    let result = state
        .orders
        .create_order(&Actor::Anonymous, table_id, payload)
        .await?;
    let status = if result.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ApiResponse::success(result))))
}

/// GET /api/qr/tables/by-code/{qr_code}
pub async fn table_by_code(
    State(state): State<ServerState>,
    Path(qr_code): Path<String>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let table = dining_table::find_by_qr(state.pool(), &qr_code)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::TableNotFound, "Unknown table code"))?;
    ok(table)
}

/// GET /api/qr/orders/{order_id}
pub async fn get_order(
    State(state): State<ServerState>,
    Path(order_id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    ok(state.orders.order_detail(&Actor::Anonymous, order_id).await?)
}
