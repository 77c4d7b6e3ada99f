use std::sync::Arc;

use crate::review::ReviewEngine;
use crate::search::SearchEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub review: Arc<ReviewEngine>,
    pub search: Arc<SearchEngine>,
}
