//! File-backed stores for the profile document and per-namespace suggestion
//! sets. Layout under the data directory:
//!
//! ```text
//! profile.json
//! profile.backup.json
//! reviews/<namespace>/suggestions.json
//! reviews/<namespace>/changelog.md
//! ```

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::review::error::ReviewError;
use crate::review::models::{ChangelogEntry, SuggestionsFile};

pub const DEFAULT_NAMESPACE: &str = "review";

const PROFILE_FILE: &str = "profile.json";
const BACKUP_FILE: &str = "profile.backup.json";
const SUGGESTIONS_FILE: &str = "suggestions.json";
const CHANGELOG_FILE: &str = "changelog.md";
const CHANGELOG_HEADER: &str = "# Resume Changelog\n\n";

/// Writes `value` as pretty JSON to a temp file beside `path`, then renames it
/// over `path`. Readers see either the old file or the new one.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ReviewError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, value)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

/// Reads and parses a JSON file. Missing files and parse failures both come
/// back as `None`; parse failures are logged.
fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return None,
        Err(e) => {
            warn!("Could not read {}: {e}", path.display());
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring unparseable {}: {e}", path.display());
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
    backup_path: PathBuf,
}

impl ProfileStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(PROFILE_FILE),
            backup_path: data_dir.join(BACKUP_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    pub fn load(&self) -> Option<Value> {
        read_json(&self.path)
    }

    pub fn save(&self, profile: &Value) -> Result<(), ReviewError> {
        write_json_atomic(&self.path, profile)?;
        info!("Saved profile to {}", self.path.display());
        Ok(())
    }

    /// Copies the current profile file to the backup path.
    /// Returns `false` when there is no profile on disk to copy.
    pub fn backup(&self) -> Result<bool, ReviewError> {
        match fs::copy(&self.path, &self.backup_path) {
            Ok(_) => {
                info!("Backed up profile to {}", self.backup_path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SuggestionStore {
    root: PathBuf,
}

impl SuggestionStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            root: data_dir.join("reviews"),
        }
    }

    /// Directory holding one namespace's files. `None` or a blank namespace
    /// maps to the default bucket; anything outside `[A-Za-z0-9_-]` is
    /// replaced so a job id can never escape the reviews root.
    pub fn namespace_dir(&self, namespace: Option<&str>) -> PathBuf {
        let raw = namespace
            .map(str::trim)
            .filter(|ns| !ns.is_empty())
            .unwrap_or(DEFAULT_NAMESPACE);
        let safe: String = raw
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(safe)
    }

    pub fn suggestions_path(&self, namespace: Option<&str>) -> PathBuf {
        self.namespace_dir(namespace).join(SUGGESTIONS_FILE)
    }

    pub fn changelog_path(&self, namespace: Option<&str>) -> PathBuf {
        self.namespace_dir(namespace).join(CHANGELOG_FILE)
    }

    pub fn load(&self, namespace: Option<&str>) -> Option<SuggestionsFile> {
        read_json(&self.suggestions_path(namespace))
    }

    /// Appends one decision line, creating the changelog (with its header)
    /// on first use. Existing lines are never rewritten.
    pub fn append_changelog(
        &self,
        namespace: Option<&str>,
        entry: &ChangelogEntry,
    ) -> Result<(), ReviewError> {
        let path = self.changelog_path(namespace);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        if file.metadata()?.len() == 0 {
            file.write_all(CHANGELOG_HEADER.as_bytes())?;
        }
        file.write_all(entry.to_line().as_bytes())?;
        Ok(())
    }
}
