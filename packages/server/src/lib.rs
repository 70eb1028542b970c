//! # Vidnote Server
//!
//! JSON API for viewers (markups, active timecodes, rendered bodies) and for
//! the password-gated admin (uploads, markup creation and edits).

pub mod config;
mod error;
pub mod routes;
mod state;

pub use config::{Secrets, ServerConfig, StorageKind};
pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use state::AppState;
