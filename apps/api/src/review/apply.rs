//! Suggestion application.
//!
//! `apply_suggestion` is the pure document edit. `ApplySession` wraps it with
//! the file concerns (backup before the first mutation, lazy profile load,
//! changelog, atomic write-back) and is the one code path used by batch
//! apply, single edits and the interactive review loop.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::review::error::ReviewError;
use crate::review::models::{
    ApplyResult, ChangelogAction, ChangelogEntry, IdSelection, Suggestion, SuggestionType,
    SuggestionsFile,
};
use crate::review::path::{self, Resolved, Segment};
use crate::review::store::{ProfileStore, SuggestionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The path did not resolve (or named nothing to remove); the document
    /// was left as it was.
    Unresolved,
}

/// Applies one suggestion to `profile` in place.
///
/// `remove` splices an array element or deletes an object key. Every other
/// type assigns `suggested` at the path, creating a missing object key or
/// appending when the index equals the array length.
pub fn apply_suggestion(suggestion: &Suggestion, profile: &mut Value) -> ApplyOutcome {
    let Some(Resolved { parent, key }) = path::resolve(profile, &suggestion.section) else {
        return ApplyOutcome::Unresolved;
    };

    match (suggestion.kind, parent, key) {
        (SuggestionType::Remove, Value::Array(items), Segment::Index(i)) => {
            if i < items.len() {
                items.remove(i);
                ApplyOutcome::Applied
            } else {
                ApplyOutcome::Unresolved
            }
        }
        (SuggestionType::Remove, Value::Object(map), Segment::Field(name)) => {
            match map.remove(&name) {
                Some(_) => ApplyOutcome::Applied,
                None => ApplyOutcome::Unresolved,
            }
        }
        (_, Value::Array(items), Segment::Index(i)) => {
            let value = Value::String(suggestion.suggested.clone());
            if i < items.len() {
                items[i] = value;
                ApplyOutcome::Applied
            } else if i == items.len() {
                items.push(value);
                ApplyOutcome::Applied
            } else {
                ApplyOutcome::Unresolved
            }
        }
        (_, Value::Object(map), Segment::Field(name)) => {
            map.insert(name, Value::String(suggestion.suggested.clone()));
            ApplyOutcome::Applied
        }
        _ => ApplyOutcome::Unresolved,
    }
}

/// Owns the profile and suggestion stores for one data directory.
#[derive(Debug, Clone)]
pub struct ReviewEngine {
    profiles: ProfileStore,
    suggestions: SuggestionStore,
}

impl ReviewEngine {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            profiles: ProfileStore::new(data_dir),
            suggestions: SuggestionStore::new(data_dir),
        }
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    pub fn suggestions(&self) -> &SuggestionStore {
        &self.suggestions
    }

    pub fn load_suggestions(&self, namespace: Option<&str>) -> Option<SuggestionsFile> {
        self.suggestions.load(namespace)
    }

    pub fn session(&self, namespace: Option<&str>) -> ApplySession<'_> {
        ApplySession {
            engine: self,
            namespace: namespace.map(str::to_string),
            profile: None,
            backup_attempted: false,
            backup_created: false,
            dirty: false,
        }
    }

    /// Applies every suggestion in the namespace that `selection` names.
    ///
    /// A missing or empty suggestions file is an empty result, not an error.
    /// A missing profile is an error once there is anything to apply.
    pub fn apply_by_ids(
        &self,
        selection: &IdSelection,
        namespace: Option<&str>,
    ) -> Result<ApplyResult, ReviewError> {
        let Some(file) = self.suggestions.load(namespace) else {
            return Ok(ApplyResult::default());
        };

        let (to_apply, skipped): (Vec<&Suggestion>, Vec<&Suggestion>) = file
            .suggestions
            .iter()
            .partition(|s| selection.contains(s.id));

        let mut result = ApplyResult {
            skipped: skipped.iter().map(|s| s.id).collect(),
            ..ApplyResult::default()
        };

        let mut session = self.session(namespace);
        for suggestion in to_apply {
            let outcome = session.apply(suggestion, ChangelogAction::Approved)?;
            result.applied.push(suggestion.id);
            if outcome == ApplyOutcome::Unresolved {
                result.unresolved.push(suggestion.id);
            }
        }
        result.backup_created = session.finish()?;

        info!(
            "Applied {} suggestion(s), skipped {}, unresolved {}",
            result.applied.len(),
            result.skipped.len(),
            result.unresolved.len()
        );
        Ok(result)
    }

    /// Applies a user-edited copy of suggestion `id`. `None` when the
    /// namespace has no such suggestion.
    pub fn apply_edited(
        &self,
        id: i64,
        suggested: &str,
        namespace: Option<&str>,
    ) -> Result<Option<ApplyResult>, ReviewError> {
        let Some(original) = self
            .suggestions
            .load(namespace)
            .and_then(|file| file.find(id).cloned())
        else {
            return Ok(None);
        };

        let edited = original.with_suggested(suggested);
        let mut session = self.session(namespace);
        let outcome = session.apply(&edited, ChangelogAction::Edited)?;
        let backup_created = session.finish()?;

        Ok(Some(ApplyResult {
            applied: vec![id],
            skipped: vec![],
            unresolved: if outcome == ApplyOutcome::Unresolved {
                vec![id]
            } else {
                vec![]
            },
            backup_created,
        }))
    }

    /// Records a skip decision for suggestion `id`. Returns `false` when the
    /// namespace has no such suggestion.
    pub fn skip(&self, id: i64, namespace: Option<&str>) -> Result<bool, ReviewError> {
        let Some(suggestion) = self
            .suggestions
            .load(namespace)
            .and_then(|file| file.find(id).cloned())
        else {
            return Ok(false);
        };
        self.session(namespace)
            .record(&suggestion, ChangelogAction::Skipped)?;
        Ok(true)
    }
}

/// A run of decisions against one namespace. The profile is read on first
/// need and written back once, by `finish`, if anything was applied.
pub struct ApplySession<'a> {
    engine: &'a ReviewEngine,
    namespace: Option<String>,
    profile: Option<Value>,
    backup_attempted: bool,
    backup_created: bool,
    dirty: bool,
}

impl<'a> ApplySession<'a> {
    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn missing_profile(&self) -> ReviewError {
        ReviewError::ProfileMissing {
            path: PathBuf::from(self.engine.profiles.path()),
        }
    }

    fn loaded(&mut self) -> Result<&mut Value, ReviewError> {
        let profile = match self.profile.take() {
            Some(profile) => profile,
            None => self
                .engine
                .profiles
                .load()
                .ok_or_else(|| self.missing_profile())?,
        };
        Ok(self.profile.insert(profile))
    }

    /// Current value at `path` in the session's view of the profile.
    /// `None` when the path is absent or there is no profile yet; only
    /// `apply` treats a missing profile as an error.
    pub fn current_value(&mut self, path: &str) -> Option<&Value> {
        if self.profile.is_none() {
            self.profile = self.engine.profiles.load();
        }
        self.profile
            .as_ref()
            .and_then(|profile| path::lookup(profile, path))
    }

    /// Applies `suggestion` and logs the decision under `action`.
    /// The first call backs up the on-disk profile before anything changes.
    pub fn apply(
        &mut self,
        suggestion: &Suggestion,
        action: ChangelogAction,
    ) -> Result<ApplyOutcome, ReviewError> {
        if !self.backup_attempted {
            self.backup_created = self.engine.profiles.backup()?;
            self.backup_attempted = true;
        }

        let profile = self.loaded()?;
        let outcome = apply_suggestion(suggestion, profile);
        if outcome == ApplyOutcome::Unresolved {
            debug!(
                "Suggestion {} path '{}' did not resolve; profile unchanged",
                suggestion.id, suggestion.section
            );
        }
        self.dirty = true;

        self.record(suggestion, action)?;
        Ok(outcome)
    }

    /// Logs a decision without touching the profile.
    pub fn record(&self, suggestion: &Suggestion, action: ChangelogAction) -> Result<(), ReviewError> {
        self.engine.suggestions.append_changelog(
            self.namespace(),
            &ChangelogEntry::for_suggestion(suggestion, action),
        )
    }

    /// Writes the profile back if anything was applied.
    /// Returns whether a backup was taken during the session.
    pub fn finish(self) -> Result<bool, ReviewError> {
        if self.dirty {
            if let Some(profile) = &self.profile {
                self.engine.profiles.save(profile)?;
            }
        }
        Ok(self.backup_created)
    }
}
