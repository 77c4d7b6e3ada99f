use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("No profile found at {path}. Import a resume before applying suggestions.")]
    ProfileMissing { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Atomic write failed: {0}")]
    Persist(#[from] tempfile::PersistError),
}
