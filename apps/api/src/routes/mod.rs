pub mod health;
pub mod ui;

use axum::{
    routing::{get, post},
    Router,
};

use crate::insight::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ui::index_handler))
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/sender/defaults",
            get(handlers::handle_sender_defaults),
        )
        // Insight API
        .route("/api/v1/insights", post(handlers::handle_generate_insight))
        .route("/api/v1/insights/batch", post(handlers::handle_batch))
        .route(
            "/api/v1/insights/batch/export",
            post(handlers::handle_batch_export),
        )
        .route(
            "/api/v1/insights/batch/upload",
            post(handlers::handle_batch_upload),
        )
        .with_state(state)
}
