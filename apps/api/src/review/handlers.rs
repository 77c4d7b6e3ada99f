//! Axum route handlers for the review API. Request shapes are validated
//! here; the engine assumes well-formed input.

use std::collections::{BTreeSet, HashMap};

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::review::error::ReviewError;
use crate::review::models::{ApplyResult, IdSelection, Suggestion, SuggestionsFile};
use crate::review::session::{run_review, Decision, ReviewSummary, Reviewer};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobQuery {
    #[serde(default)]
    pub job_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum IdsField {
    Keyword(String),
    List(Vec<i64>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    #[serde(default)]
    pub ids: Option<IdsField>,
    #[serde(default)]
    pub job_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    pub suggested: String,
    #[serde(default)]
    pub job_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipRequest {
    #[serde(default)]
    pub job_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DecisionInput {
    Approve,
    Edit { text: String },
    Manual,
    Skip,
}

#[derive(Debug, Deserialize)]
pub struct DecisionItem {
    pub id: i64,
    #[serde(flatten)]
    pub decision: DecisionInput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    #[serde(default)]
    pub job_id: Option<String>,
    pub decisions: Vec<DecisionItem>,
}

/// Turns the raw `ids` field into a selection: the literal `"all"` or a
/// non-empty list of integers.
pub fn parse_selection(ids: Option<IdsField>) -> Result<IdSelection, AppError> {
    match ids {
        None => Err(AppError::Validation("ids is required".to_string())),
        Some(IdsField::Keyword(keyword)) if keyword == "all" => Ok(IdSelection::All),
        Some(IdsField::Keyword(other)) => Err(AppError::Validation(format!(
            "ids must be \"all\" or a list of integers, got \"{other}\""
        ))),
        Some(IdsField::List(list)) if list.is_empty() => {
            Err(AppError::Validation("ids cannot be empty".to_string()))
        }
        Some(IdsField::List(list)) => Ok(IdSelection::Ids(list.into_iter().collect::<BTreeSet<_>>())),
    }
}

/// Decisions submitted from the UI, keyed by suggestion id. Suggestions the
/// user has not decided on yet are deferred.
struct SubmittedDecisions(HashMap<i64, DecisionInput>);

impl Reviewer for SubmittedDecisions {
    fn decide(&mut self, suggestion: &Suggestion, _live: Option<&Value>) -> Decision {
        match self.0.get(&suggestion.id) {
            Some(DecisionInput::Approve) => Decision::Approve,
            Some(DecisionInput::Edit { text }) => Decision::Edit(text.clone()),
            Some(DecisionInput::Manual) => Decision::Manual,
            Some(DecisionInput::Skip) => Decision::Skip,
            None => Decision::Defer,
        }
    }
}

async fn blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, ReviewError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(AppError::from)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/profile
pub async fn handle_get_profile(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let engine = state.review.clone();
    blocking(move || Ok(engine.profiles().load()))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No profile found".to_string()))
}

/// GET /api/suggestions?jobId=
pub async fn handle_get_suggestions(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> Result<Json<SuggestionsFile>, AppError> {
    let engine = state.review.clone();
    let namespace = query.job_id.clone();
    blocking(move || Ok(engine.load_suggestions(namespace.as_deref())))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No suggestions found".to_string()))
}

/// POST /api/suggestions/apply
pub async fn handle_apply(
    State(state): State<AppState>,
    payload: Result<Json<ApplyRequest>, JsonRejection>,
) -> Result<Json<ApplyResult>, AppError> {
    let Json(request) = payload?;
    let selection = parse_selection(request.ids)?;
    let engine = state.review.clone();
    let namespace = request.job_id;

    let result = blocking(move || engine.apply_by_ids(&selection, namespace.as_deref())).await?;
    Ok(Json(result))
}

/// POST /api/suggestions/:id/edit
pub async fn handle_edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<EditRequest>, JsonRejection>,
) -> Result<Json<ApplyResult>, AppError> {
    let Json(request) = payload?;
    if request.suggested.trim().is_empty() {
        return Err(AppError::Validation("suggested cannot be empty".to_string()));
    }
    let engine = state.review.clone();
    let namespace = request.job_id;
    let suggested = request.suggested;

    blocking(move || engine.apply_edited(id, &suggested, namespace.as_deref()))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Suggestion {id} not found")))
}

/// POST /api/suggestions/:id/skip
pub async fn handle_skip(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Option<Json<SkipRequest>>,
) -> Result<Json<Value>, AppError> {
    let namespace = payload.and_then(|Json(request)| request.job_id);
    let engine = state.review.clone();

    let found = blocking(move || engine.skip(id, namespace.as_deref())).await?;
    if !found {
        return Err(AppError::NotFound(format!("Suggestion {id} not found")));
    }
    Ok(Json(serde_json::json!({ "skipped": id })))
}

/// POST /api/review
///
/// Walks the suggestions in file order, acting on each submitted decision.
pub async fn handle_review(
    State(state): State<AppState>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<ReviewSummary>, AppError> {
    let Json(request) = payload?;
    if request.decisions.is_empty() {
        return Err(AppError::Validation("decisions cannot be empty".to_string()));
    }
    let mut reviewer = SubmittedDecisions(
        request
            .decisions
            .into_iter()
            .map(|item| (item.id, item.decision))
            .collect(),
    );
    let engine = state.review.clone();
    let namespace = request.job_id;

    let summary =
        blocking(move || run_review(&engine, namespace.as_deref(), &mut reviewer)).await?;
    Ok(Json(summary))
}
