//! 前厅服务 API - STAFF / OWNER
//!
//! Table-level settlement is reachable both by table id and by the id of
//! any open order on the table.

mod handler;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/service", routes())
}

fn routes() -> Router<ServerState> {
    let table_routes = Router::new()
        .route(
            "/tables/{table_id}/orders",
            get(handler::table_orders).post(handler::create_order),
        )
        .route("/tables/{table_id}/complete", post(handler::complete_table))
        .route("/tables/{table_id}/cancel", post(handler::cancel_table))
        .route("/tables/{table_id}/status", put(handler::set_table_status));

    let order_routes = Router::new()
        .route("/orders", get(handler::open_orders))
        .route("/orders/{id}/complete", post(handler::complete_table_of_order))
        .route("/orders/{id}/complete-single", post(handler::complete_order))
        .route("/orders/{id}/cancel", post(handler::cancel_table_of_order))
        .route(
            "/orders/{id}/items/{item_id}",
            delete(handler::delete_item).patch(handler::reduce_item),
        );

    table_routes.merge(order_routes)
}
