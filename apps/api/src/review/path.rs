//! Path addressing into the profile document.
//!
//! A path is a run of segments: `identifier` (object property) or `[digits]`
//! (array index), with `.` between a segment and a following identifier.
//! Examples: `summary`, `experience[0].bullets[1]`, `skills[0].items[2]`.
//!
//! Resolution never creates structure and never mutates. It hands back the
//! direct parent container plus the final segment, so the caller decides
//! whether to assign, delete, or splice.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Field(String),
    Index(usize),
}

/// The parent container of a path's target, plus the key to mutate through.
/// `parent` is always an object when `key` is a field and an array when `key`
/// is an index.
#[derive(Debug)]
pub struct Resolved<'a> {
    pub parent: &'a mut Value,
    pub key: Segment,
}

fn is_field_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '$'
}

/// Tokenizes a path in one pass. Returns `None` for empty or malformed input
/// (`a..b`, `a[`, `a[x]`, `a[0]b`, trailing `.`).
pub fn parse_path(path: &str) -> Option<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut chars = path.chars().peekable();
    let mut after_dot = false;

    while let Some(&c) = chars.peek() {
        match c {
            '[' => {
                if after_dot {
                    return None;
                }
                chars.next();
                let mut digits = String::new();
                while let Some(&d) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    digits.push(d);
                    chars.next();
                }
                if digits.is_empty() || chars.next() != Some(']') {
                    return None;
                }
                segments.push(Segment::Index(digits.parse().ok()?));
            }
            '.' => {
                if segments.is_empty() || after_dot {
                    return None;
                }
                chars.next();
                after_dot = true;
            }
            c if is_field_char(c) => {
                // An identifier must open the path or follow a dot.
                if !segments.is_empty() && !after_dot {
                    return None;
                }
                let mut name = String::new();
                while let Some(&n) = chars.peek() {
                    if !is_field_char(n) {
                        break;
                    }
                    name.push(n);
                    chars.next();
                }
                segments.push(Segment::Field(name));
                after_dot = false;
            }
            _ => return None,
        }
    }

    if segments.is_empty() || after_dot {
        None
    } else {
        Some(segments)
    }
}

fn step<'v>(value: &'v Value, segment: &Segment) -> Option<&'v Value> {
    match segment {
        Segment::Field(name) => value.as_object()?.get(name),
        Segment::Index(i) => value.as_array()?.get(*i),
    }
}

fn step_mut<'v>(value: &'v mut Value, segment: &Segment) -> Option<&'v mut Value> {
    let next = match segment {
        Segment::Field(name) => value.as_object_mut()?.get_mut(name)?,
        Segment::Index(i) => value.as_array_mut()?.get_mut(*i)?,
    };
    if next.is_null() {
        None
    } else {
        Some(next)
    }
}

/// Resolves `path` to its parent container and final key.
///
/// Every intermediate segment must exist and be non-null. The final segment
/// need not exist: a missing object key or an array index is handed back
/// as-is and the caller decides what an absent target means.
pub fn resolve<'a>(document: &'a mut Value, path: &str) -> Option<Resolved<'a>> {
    let mut segments = parse_path(path)?;
    let key = segments.pop()?;

    let mut current = document;
    for segment in &segments {
        current = step_mut(current, segment)?;
    }

    let kind_matches = matches!(
        (&*current, &key),
        (Value::Object(_), Segment::Field(_)) | (Value::Array(_), Segment::Index(_))
    );
    if !kind_matches {
        return None;
    }

    Some(Resolved {
        parent: current,
        key,
    })
}

/// Reads the value at `path`, if every segment is present.
pub fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let segments = parse_path(path)?;
    segments
        .iter()
        .try_fold(document, |current, segment| step(current, segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_simple_field() {
        assert_eq!(
            parse_path("summary"),
            Some(vec![Segment::Field("summary".to_string())])
        );
    }

    #[test]
    fn test_parse_mixed_segments() {
        assert_eq!(
            parse_path("experience[0].bullets[12]"),
            Some(vec![
                Segment::Field("experience".to_string()),
                Segment::Index(0),
                Segment::Field("bullets".to_string()),
                Segment::Index(12),
            ])
        );
    }

    #[test]
    fn test_parse_consecutive_indices() {
        assert_eq!(
            parse_path("matrix[1][2]"),
            Some(vec![
                Segment::Field("matrix".to_string()),
                Segment::Index(1),
                Segment::Index(2),
            ])
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            ".",
            "a.",
            ".a",
            "a..b",
            "a[",
            "a[]",
            "a[x]",
            "a[0]b",
            "a b",
            "a]",
            "a.[0]",
        ] {
            assert_eq!(parse_path(bad), None, "expected {bad:?} to be rejected");
        }
    }

    #[test]
    fn test_resolve_returns_parent_and_key() {
        let mut doc = json!({"experience": [{"bullets": ["a", "b"]}]});
        let resolved = resolve(&mut doc, "experience[0].bullets[1]").unwrap();
        assert_eq!(resolved.key, Segment::Index(1));
        assert_eq!(*resolved.parent, json!(["a", "b"]));
    }

    #[test]
    fn test_resolve_missing_final_key_is_allowed() {
        let mut doc = json!({"name": "Ada"});
        let resolved = resolve(&mut doc, "summary").unwrap();
        assert_eq!(resolved.key, Segment::Field("summary".to_string()));
    }

    #[test]
    fn test_resolve_missing_intermediate_fails() {
        let mut doc = json!({"experience": []});
        assert!(resolve(&mut doc, "experience[3].bullets[0]").is_none());
        assert!(resolve(&mut doc, "education[0].school").is_none());
    }

    #[test]
    fn test_resolve_null_intermediate_fails() {
        let mut doc = json!({"education": null});
        assert!(resolve(&mut doc, "education[0]").is_none());
    }

    #[test]
    fn test_resolve_kind_mismatch_fails() {
        let mut doc = json!({"skills": {"core": "rust"}, "summary": "text"});
        assert!(resolve(&mut doc, "skills[0]").is_none());
        assert!(resolve(&mut doc, "summary.first").is_none());
    }

    #[test]
    fn test_resolve_malformed_path_fails() {
        let mut doc = json!({"summary": "x"});
        assert!(resolve(&mut doc, "summary[").is_none());
        assert!(resolve(&mut doc, "").is_none());
    }

    #[test]
    fn test_lookup_reads_nested_value() {
        let doc = json!({"skills": [{"items": ["go", "rust", "sql"]}]});
        assert_eq!(lookup(&doc, "skills[0].items[2]"), Some(&json!("sql")));
        assert_eq!(lookup(&doc, "skills[1].items[0]"), None);
    }
}
