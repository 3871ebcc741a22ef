use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/salons", get(handlers::salon::list_salons))
        .route("/api/salons/:id", get(handlers::salon::get_salon))
        .route("/api/admin/salons", post(handlers::salon::create_salon))
        .route("/api/admin/salons/:id", put(handlers::salon::update_salon))
        .route(
            "/api/admin/salons/:id",
            delete(handlers::salon::delete_salon),
        )
}
