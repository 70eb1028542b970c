//! Error types for the draft session

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("A draft is already open")]
    AlreadyDrafting,

    #[error("No draft is open")]
    NotDrafting,

    #[error("Invalid start time: {0}")]
    InvalidStart(f64),

    #[error("No timecode with id {0}")]
    UnknownTimecode(String),
}
