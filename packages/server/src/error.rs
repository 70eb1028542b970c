use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::warn;
use vidnote_store::{BlobError, StoreError};

/// Every failure a handler can answer with. The body is always
/// `{"error": "<message>"}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Server not configured")]
    NotConfigured,

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Blob(#[from] BlobError),

    #[error("server")]
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => ApiError::NotFound,
            other => ApiError::Store(other),
        }
    }
}

impl ApiError {
    pub fn missing() -> Self {
        ApiError::BadRequest("missing".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Blob(_) => StatusCode::BAD_GATEWAY,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Blob(e) => warn!(error = %e, "blob storage call failed"),
            ApiError::Store(e) => warn!(error = %e, "markup store call failed"),
            _ => {}
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
