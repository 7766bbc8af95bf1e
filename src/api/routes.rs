use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{events, health, replay};
use super::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // The recorder runs as a browser extension on whatever page is being recorded
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/health", get(health::health_check))
        // Recorder sink
        .route("/action-data", post(events::receive_event))
        // Compiled plans
        .route(
            "/tasks/:task_id/exact-replay",
            get(replay::get_exact_replay),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
