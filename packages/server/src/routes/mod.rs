//! HTTP surface.

mod admin;
mod markups;

use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;

pub const ADMIN_HEADER: &str = "x-admin-password";

pub fn router(state: AppState) -> Router {
    let upload_limit = state.max_upload_bytes;

    Router::new()
        .route("/api/markups", get(markups::list_markups))
        .route("/api/markups/:id", get(markups::get_markup))
        .route("/api/markups/:id/active", get(markups::active_timecodes))
        .route("/api/markups/:id/rendered", get(markups::rendered_timecodes))
        .route("/api/admin/check", post(admin::check))
        .route("/api/admin/create", post(admin::create_markup))
        .route("/api/admin/upload-image", post(admin::upload_image))
        .route("/api/admin/resolve-download", post(markups::resolve_download))
        .route(
            "/api/admin/:id",
            put(admin::update_markup).delete(admin::delete_markup),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
