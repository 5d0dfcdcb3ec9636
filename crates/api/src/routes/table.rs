use axum::{routing::get, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/tables",
            get(handlers::table::list_tables).post(handlers::table::create_table),
        )
        .route(
            "/api/tables/:id",
            get(handlers::table::get_table)
                .put(handlers::table::update_table)
                .delete(handlers::table::delete_table),
        )
}
