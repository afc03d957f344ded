//! 健康检查路由 - 公共路由 (无需认证)

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    /// 状态 (ok | degraded)
    status: &'static str,
    service: &'static str,
    version: &'static str,
    database: bool,
    timezone: String,
}

/// GET /health
pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let database = sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(state.pool())
        .await
        .map_err(|e| tracing::warn!(error = %e, "Health check database probe failed"))
        .is_ok();

    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        service: "dine-server",
        version: env!("CARGO_PKG_VERSION"),
        database,
        timezone: state.config.timezone.to_string(),
    })
}
