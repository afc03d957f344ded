//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`qr`] - 扫码点餐 (匿名)
//! - [`kitchen`] - 厨房
//! - [`service`] - 前厅服务
//! - [`tables`] - 桌台查询
//! - [`admin`] - 店主管理
//! - [`ws`] - 实时推送
//! - [`rate_limit`] - 限流中间件

pub mod admin;
pub mod health;
pub mod kitchen;
pub mod qr;
pub mod rate_limit;
pub mod service;
pub mod tables;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use validator::Validate;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// Full application router
pub fn router(state: ServerState) -> Router {
    let timeout = state.config.request_timeout();

    Router::new()
        .merge(health::router())
        .merge(qr::router(&state))
        .merge(kitchen::router())
        .merge(service::router())
        .merge(tables::router())
        .merge(admin::router())
        .merge(ws::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)),
        )
        .with_state(state)
}

/// Run the payload's field rules
pub(crate) fn validated<T: Validate>(payload: T) -> AppResult<T> {
    payload.validate().map_err(|e| {
        let fields: Vec<String> = e.field_errors().keys().map(|k| k.to_string()).collect();
        AppError::validation(format!("Invalid fields: {}", fields.join(", ")))
    })?;
    Ok(payload)
}
