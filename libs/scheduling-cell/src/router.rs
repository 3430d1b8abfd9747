// libs/scheduling-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn scheduling_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/appointments", post(handlers::book_appointment))
        .route(
            "/appointments/check-conflicts",
            post(handlers::check_conflicts),
        )
        .route("/appointments/find-slots", post(handlers::find_slots))
        .with_state(state)
}
