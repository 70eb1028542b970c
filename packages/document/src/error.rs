use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The payload is not structured data at all. Callers recover by
    /// treating it as plain text (see [`crate::deserialize_lossy`]).
    #[error("Malformed payload at {line}:{column}: {message}")]
    MalformedPayload {
        line: usize,
        column: usize,
        message: String,
    },
}

impl ParseError {
    pub fn malformed(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            line,
            column,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        ParseError::malformed(e.line(), e.column(), e.to_string())
    }
}
