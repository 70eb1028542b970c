use thiserror::Error;
use vidnote_document::LogicalPath;

pub type BlobResult<T> = Result<T, BlobError>;
pub type StoreResult<T> = Result<T, StoreError>;

/// Blob-storage failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlobError {
    /// No fetchable URL could be issued for the path.
    #[error("No download link for {path}: {reason}")]
    Unavailable { path: LogicalPath, reason: String },

    /// Something already lives at the path and overwriting is not allowed.
    #[error("Path already exists: {path}")]
    Conflict { path: LogicalPath },

    #[error("Blob storage failure: {0}")]
    Failure(String),
}

impl BlobError {
    pub fn unavailable(path: &LogicalPath, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            path: path.clone(),
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for BlobError {
    fn from(e: reqwest::Error) -> Self {
        BlobError::Failure(e.to_string())
    }
}

/// Markup persistence failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Markup not found: {0}")]
    NotFound(String),

    #[error("Markup store unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Unavailable(format!("corrupt record: {}", e))
    }
}
