//! Axum route handler for job search.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::search::models::{JobResult, SearchOptions};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub options: SearchOptions,
}

/// POST /api/search
///
/// Results keep first-seen order across sources; they are not re-sorted by
/// score globally.
pub async fn handle_search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<Vec<JobResult>>, AppError> {
    let Json(request) = payload?;
    let query = request.query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("query cannot be empty".to_string()));
    }

    let results = state.search.search(query, &request.options).await;
    Ok(Json(results))
}
