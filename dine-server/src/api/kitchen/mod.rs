//! Kitchen API - CHEF only

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/kitchen", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/orders", get(handler::queue))
        .route("/orders/{id}", get(handler::get_order))
        .route("/orders/{id}/ready", post(handler::mark_ready))
}
