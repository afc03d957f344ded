//! Kitchen Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::OrderDetail;

use crate::auth::{Actor, CurrentUser};
use crate::core::ServerState;
use crate::orders::ManagerError;
use crate::utils::{ApiResponse, AppResult, ok};

/// GET /api/kitchen/orders - in-progress first, then ready
pub async fn queue(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<OrderDetail>>>> {
    ok(state.orders.kitchen_queue(&Actor::from(user)).await?)
}

/// GET /api/kitchen/orders/{id}
pub async fn get_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let actor = Actor::from(user);
    if actor.kitchen().is_none() {
        return Err(ManagerError::Forbidden("view kitchen orders").into());
    }
    ok(state.orders.order_detail(&actor, id).await?)
}

/// POST /api/kitchen/orders/{id}/ready
pub async fn mark_ready(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    ok(state.orders.mark_ready(&Actor::from(user), id).await?)
}
