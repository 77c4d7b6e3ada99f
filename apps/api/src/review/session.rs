//! Driver for one-at-a-time review. Whatever collects the user's decisions
//! (a terminal prompt, a UI) implements `Reviewer`; `run_review` feeds each
//! decision through the same `ApplySession` that batch apply uses.

use serde::Serialize;
use serde_json::Value;

use crate::review::apply::{ApplyOutcome, ReviewEngine};
use crate::review::error::ReviewError;
use crate::review::models::{ChangelogAction, Suggestion};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Approve,
    /// Apply with user-supplied text in place of `suggested`.
    Edit(String),
    /// The user will change the profile by hand; logged only.
    Manual,
    Skip,
    /// Leave this one undecided and move on; nothing is logged.
    Defer,
    /// Stop reviewing; remaining suggestions are left undecided.
    Quit,
}

pub trait Reviewer {
    /// `live` is the value currently at the suggestion's path, if any.
    fn decide(&mut self, suggestion: &Suggestion, live: Option<&Value>) -> Decision;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub approved: usize,
    pub edited: usize,
    pub manual: usize,
    pub skipped: usize,
    pub unresolved: usize,
    pub remaining: usize,
    pub backup_created: bool,
}

pub fn run_review(
    engine: &ReviewEngine,
    namespace: Option<&str>,
    reviewer: &mut dyn Reviewer,
) -> Result<ReviewSummary, ReviewError> {
    let mut summary = ReviewSummary::default();
    let Some(file) = engine.load_suggestions(namespace) else {
        return Ok(summary);
    };

    let mut session = engine.session(namespace);
    let total = file.suggestions.len();

    for (position, suggestion) in file.suggestions.iter().enumerate() {
        let decision = {
            let live = session.current_value(&suggestion.section);
            reviewer.decide(suggestion, live)
        };

        let outcome = match decision {
            Decision::Approve => {
                summary.approved += 1;
                Some(session.apply(suggestion, ChangelogAction::Approved)?)
            }
            Decision::Edit(text) => {
                summary.edited += 1;
                Some(session.apply(&suggestion.with_suggested(text), ChangelogAction::Edited)?)
            }
            Decision::Manual => {
                summary.manual += 1;
                session.record(suggestion, ChangelogAction::Manual)?;
                None
            }
            Decision::Skip => {
                summary.skipped += 1;
                session.record(suggestion, ChangelogAction::Skipped)?;
                None
            }
            Decision::Defer => {
                summary.remaining += 1;
                None
            }
            Decision::Quit => {
                summary.remaining += total - position;
                break;
            }
        };

        if outcome == Some(ApplyOutcome::Unresolved) {
            summary.unresolved += 1;
        }
    }

    summary.backup_created = session.finish()?;
    Ok(summary)
}
