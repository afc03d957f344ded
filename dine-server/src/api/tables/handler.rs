//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::DiningTable;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::dining_table;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

/// GET /api/tables - 本店所有桌台 (按桌号)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<DiningTable>>>> {
    ok(dining_table::find_all(state.pool(), user.restaurant_id).await?)
}

/// GET /api/tables/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    ok(state.tables.table(Some(user.restaurant_id), id).await?)
}

/// GET /api/tables/number/{number}
pub async fn get_by_number(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(number): Path<i32>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let table = dining_table::find_by_number(state.pool(), user.restaurant_id, number)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::TableNotFound, format!("Table {number} not found"))
                .with_detail("table_number", number)
        })?;
    ok(table)
}
