use axum::{routing::get, routing::patch, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/reservations/check-availability",
            get(handlers::reservation::check_availability),
        )
        .route(
            "/api/reservations/my-reservations",
            get(handlers::reservation::my_reservations),
        )
        .route(
            "/api/reservations",
            get(handlers::reservation::list_reservations)
                .post(handlers::reservation::create_reservation),
        )
        .route(
            "/api/reservations/:id",
            get(handlers::reservation::get_reservation)
                .put(handlers::reservation::update_reservation)
                .delete(handlers::reservation::delete_reservation),
        )
        .route(
            "/api/reservations/:id/cancel",
            patch(handlers::reservation::cancel_reservation),
        )
}
