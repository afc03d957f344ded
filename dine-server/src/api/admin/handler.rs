//! Admin Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::models::{DiningTable, DiningTableCreate, OrderDetail, OrderPage, OrderQuery, Product, ProductCreate};
use validator::Validate;

use crate::api::validated;
use crate::auth::{Actor, CurrentUser};
use crate::core::ServerState;
use crate::db::repository::{RepoError, dining_table, product};
use crate::orders::ManagerError;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTableRequest {
    #[validate(range(min = 1, max = 9999))]
    pub table_number: i32,
    #[validate(range(min = 1, max = 100))]
    pub capacity: Option<i32>,
    #[validate(length(max = 100))]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 0.0, max = 1_000_000.0))]
    pub price: f64,
    #[validate(length(max = 500))]
    pub image: Option<String>,
}

fn require_owner(user: CurrentUser, what: &'static str) -> AppResult<CurrentUser> {
    Actor::from(user)
        .owner()
        .copied()
        .ok_or_else(|| ManagerError::Forbidden(what).into())
}

/// GET /api/admin/orders
pub async fn list_orders(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<OrderQuery>,
) -> AppResult<Json<ApiResponse<OrderPage>>> {
    let page = state.orders.search_orders(&Actor::from(user), query).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// GET /api/admin/orders/{id}
pub async fn get_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let detail = state.orders.admin_order(&Actor::from(user), id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// POST /api/admin/tables - 桌号在店内唯一
pub async fn create_table(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CreateTableRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<DiningTable>>)> {
    let owner = require_owner(user, "create tables")?;
    let payload = validated(payload)?;
    let data = DiningTableCreate {
        table_number: payload.table_number,
        capacity: payload.capacity,
        location: payload.location,
    };

    let table = dining_table::create(state.pool(), owner.restaurant_id, &data)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::TableNumberExists, msg)
                .with_detail("table_number", data.table_number),
            other => other.into(),
        })?;

    tracing::info!(
        table_id = %table.id,
        table_number = table.table_number,
        restaurant_id = %owner.restaurant_id,
        "Table created"
    );
    Ok((StatusCode::CREATED, Json(ApiResponse::success(table))))
}

/// POST /api/admin/products
pub async fn create_product(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let owner = require_owner(user, "register products")?;
    let payload = validated(payload)?;
    let data = ProductCreate {
        name: payload.name,
        price: payload.price,
        image: payload.image,
    };

    let created = product::create(state.pool(), owner.restaurant_id, &data).await?;
    tracing::info!(product_id = %created.id, name = %created.name, "Product registered");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}
