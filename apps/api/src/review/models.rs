use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionType {
    Rewrite,
    Restructure,
    Add,
    Remove,
}

impl SuggestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionType::Rewrite => "rewrite",
            SuggestionType::Restructure => "restructure",
            SuggestionType::Add => "add",
            SuggestionType::Remove => "remove",
        }
    }
}

/// One proposed edit to the profile. `section` is a path into the profile
/// document (see `review::path`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: i64,
    pub section: String,
    #[serde(rename = "type")]
    pub kind: SuggestionType,
    #[serde(default)]
    pub current: String,
    #[serde(default)]
    pub suggested: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub principle: String,
}

impl Suggestion {
    /// Derived copy carrying user-edited text. The original stays untouched.
    pub fn with_suggested(&self, suggested: impl Into<String>) -> Self {
        Self {
            suggested: suggested.into(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsFile {
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

impl SuggestionsFile {
    pub fn find(&self, id: i64) -> Option<&Suggestion> {
        self.suggestions.iter().find(|s| s.id == id)
    }
}

/// Which suggestions a batch apply targets. Validated at the HTTP boundary:
/// `Ids` is never empty once it reaches the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdSelection {
    All,
    Ids(BTreeSet<i64>),
}

impl IdSelection {
    pub fn contains(&self, id: i64) -> bool {
        match self {
            IdSelection::All => true,
            IdSelection::Ids(ids) => ids.contains(&id),
        }
    }
}

/// Result of one apply call. Both id lists keep the suggestions file order.
/// `unresolved` is the subset of `applied` whose path did not resolve, so the
/// profile was left as it was for those ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyResult {
    pub applied: Vec<i64>,
    pub skipped: Vec<i64>,
    pub unresolved: Vec<i64>,
    pub backup_created: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangelogAction {
    Approved,
    Edited,
    Manual,
    Skipped,
}

impl fmt::Display for ChangelogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChangelogAction::Approved => "approved",
            ChangelogAction::Edited => "edited",
            ChangelogAction::Manual => "manual",
            ChangelogAction::Skipped => "skipped",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangelogEntry {
    pub timestamp: DateTime<Utc>,
    pub action: ChangelogAction,
    pub section: String,
    pub principle: String,
    #[serde(rename = "type")]
    pub kind: SuggestionType,
}

impl ChangelogEntry {
    pub fn for_suggestion(suggestion: &Suggestion, action: ChangelogAction) -> Self {
        Self {
            timestamp: Utc::now(),
            action,
            section: suggestion.section.clone(),
            principle: suggestion.principle.clone(),
            kind: suggestion.kind,
        }
    }

    /// Single markdown list line, newline-terminated.
    pub fn to_line(&self) -> String {
        let principle = if self.principle.is_empty() {
            "-"
        } else {
            self.principle.as_str()
        };
        format!(
            "- {} | {} | `{}` | {} | {}\n",
            self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.action,
            self.section,
            self.kind.as_str(),
            principle
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_suggestion_deserializes_type_field() {
        let s: Suggestion = serde_json::from_value(json!({
            "id": 3,
            "section": "experience[0].bullets[1]",
            "type": "restructure",
            "current": "Did things",
            "suggested": "Shipped things",
            "reason": "Lead with the outcome",
            "principle": "impact-first"
        }))
        .unwrap();
        assert_eq!(s.kind, SuggestionType::Restructure);
        assert_eq!(s.section, "experience[0].bullets[1]");
    }

    #[test]
    fn test_suggestions_file_tolerates_missing_job_id() {
        let file: SuggestionsFile = serde_json::from_value(json!({
            "generatedAt": "2024-05-01T10:00:00.000Z",
            "suggestions": []
        }))
        .unwrap();
        assert!(file.job_id.is_none());
        assert!(file.suggestions.is_empty());
    }

    #[test]
    fn test_suggestions_file_tolerates_missing_generated_at() {
        let file: SuggestionsFile = serde_json::from_value(json!({
            "jobId": "acme-backend",
            "suggestions": [{
                "id": 3,
                "section": "summary",
                "type": "rewrite",
                "current": "Old",
                "suggested": "New",
                "reason": "",
                "principle": ""
            }]
        }))
        .unwrap();
        assert!(file.generated_at.is_none());
        assert_eq!(file.find(3).map(|s| s.suggested.as_str()), Some("New"));
    }

    #[test]
    fn test_with_suggested_leaves_original() {
        let original = Suggestion {
            id: 1,
            section: "summary".to_string(),
            kind: SuggestionType::Rewrite,
            current: "Old".to_string(),
            suggested: "New".to_string(),
            reason: String::new(),
            principle: String::new(),
        };
        let edited = original.with_suggested("Mine");
        assert_eq!(edited.suggested, "Mine");
        assert_eq!(original.suggested, "New");
        assert_eq!(edited.id, original.id);
    }

    #[test]
    fn test_id_selection_membership() {
        let ids = IdSelection::Ids([1, 4].into_iter().collect());
        assert!(ids.contains(4));
        assert!(!ids.contains(2));
        assert!(IdSelection::All.contains(99));
    }

    #[test]
    fn test_apply_result_serializes_camel_case() {
        let result = ApplyResult {
            applied: vec![1],
            skipped: vec![2],
            unresolved: vec![],
            backup_created: true,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["backupCreated"], json!(true));
    }

    #[test]
    fn test_changelog_line_format() {
        let entry = ChangelogEntry {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
            action: ChangelogAction::Edited,
            section: "summary".to_string(),
            principle: "clarity".to_string(),
            kind: SuggestionType::Rewrite,
        };
        assert_eq!(
            entry.to_line(),
            "- 2024-05-01T09:30:00Z | edited | `summary` | rewrite | clarity\n"
        );
    }
}
