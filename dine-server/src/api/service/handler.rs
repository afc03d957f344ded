//! Service Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::models::{
    DiningTable, ItemQuantityUpdate, OrderCreate, OrderCreated, OrderDetail, TableSettlement,
    TableStatusUpdate,
};
use validator::Validate;

use crate::api::validated;
use crate::auth::{Actor, CurrentUser};
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok, ok_with_message};

/// Optional cancel body
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CancelRequest {
    #[validate(length(max = 500))]
    #[serde(default)]
    pub reason: Option<String>,
}

fn cancel_reason(body: Option<Json<CancelRequest>>) -> AppResult<Option<String>> {
    let body = validated(body.map(|Json(b)| b).unwrap_or_default())?;
    Ok(body.reason.filter(|r| !r.trim().is_empty()))
}

/// GET /api/service/orders - open orders, newest first
pub async fn open_orders(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<OrderDetail>>>> {
    ok(state.orders.service_orders(&Actor::from(user)).await?)
}

/// GET /api/service/tables/{table_id}/orders
pub async fn table_orders(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(table_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<OrderDetail>>>> {
    ok(state.orders.table_orders(&Actor::from(user), table_id).await?)
}

/// POST /api/service/tables/{table_id}/orders - staff-entered cart
pub async fn create_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(table_id): Path<i64>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderCreated>>)> {
    let result = state
        .orders
        .create_order(&Actor::from(user), table_id, payload)
        .await?;
    let status = if result.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ApiResponse::success(result))))
}

/// POST /api/service/tables/{table_id}/complete
pub async fn complete_table(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(table_id): Path<i64>,
) -> AppResult<Json<ApiResponse<TableSettlement>>> {
    let settlement = state
        .orders
        .complete_table(&Actor::from(user), table_id)
        .await?;
    ok_with_message("Table completed", settlement)
}

/// POST /api/service/tables/{table_id}/cancel
pub async fn cancel_table(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(table_id): Path<i64>,
    body: Option<Json<CancelRequest>>,
) -> AppResult<Json<ApiResponse<TableSettlement>>> {
    let reason = cancel_reason(body)?;
    let settlement = state
        .orders
        .cancel_table(&Actor::from(user), table_id, reason)
        .await?;
    ok_with_message("Table orders cancelled", settlement)
}

/// PUT /api/service/tables/{table_id}/status - pause / unpause
pub async fn set_table_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(table_id): Path<i64>,
    Json(payload): Json<TableStatusUpdate>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    ok(state
        .orders
        .set_table_status(&Actor::from(user), table_id, payload.status)
        .await?)
}

/// POST /api/service/orders/{id}/complete - settle the order's table
pub async fn complete_table_of_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<TableSettlement>>> {
    let settlement = state
        .orders
        .complete_table_of_order(&Actor::from(user), id)
        .await?;
    ok_with_message("Table completed", settlement)
}

/// POST /api/service/orders/{id}/complete-single
pub async fn complete_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    ok(state.orders.complete_order(&Actor::from(user), id).await?)
}

/// POST /api/service/orders/{id}/cancel - cancel the order's table
pub async fn cancel_table_of_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    body: Option<Json<CancelRequest>>,
) -> AppResult<Json<ApiResponse<TableSettlement>>> {
    let reason = cancel_reason(body)?;
    let settlement = state
        .orders
        .cancel_table_of_order(&Actor::from(user), id, reason)
        .await?;
    ok_with_message("Table orders cancelled", settlement)
}

/// DELETE /api/service/orders/{id}/items/{item_id}
pub async fn delete_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((id, item_id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    ok(state
        .orders
        .delete_item(&Actor::from(user), id, item_id)
        .await?)
}

/// PATCH /api/service/orders/{id}/items/{item_id} - lower the quantity
pub async fn reduce_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((id, item_id)): Path<(i64, i64)>,
    Json(payload): Json<ItemQuantityUpdate>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    ok(state
        .orders
        .reduce_item(&Actor::from(user), id, item_id, payload.quantity)
        .await?)
}
