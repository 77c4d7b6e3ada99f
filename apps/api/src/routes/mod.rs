pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::review::handlers as review;
use crate::search::handlers as search;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Review API
        .route("/api/profile", get(review::handle_get_profile))
        .route("/api/suggestions", get(review::handle_get_suggestions))
        .route("/api/suggestions/apply", post(review::handle_apply))
        .route("/api/suggestions/:id/edit", post(review::handle_edit))
        .route("/api/suggestions/:id/skip", post(review::handle_skip))
        .route("/api/review", post(review::handle_review))
        // Search API
        .route("/api/search", post(search::handle_search))
        .with_state(state)
}
