use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/reservations",
            post(handlers::reservation::create_reservation)
                .get(handlers::reservation::list_reservations),
        )
        .route(
            "/api/reservations/:id",
            get(handlers::reservation::get_reservation),
        )
        .route(
            "/api/reservations/:id",
            put(handlers::reservation::update_reservation),
        )
        .route(
            "/api/reservations/:id",
            delete(handlers::reservation::cancel_reservation),
        )
}
