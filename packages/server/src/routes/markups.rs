use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use vidnote_document::LogicalPath;
use vidnote_timeline::{active_at, MarkupSummary, Timecode};

#[derive(Debug, Serialize)]
pub struct MarkupView {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub timecodes: Vec<Timecode>,
    /// Fetchable video URL, when one could be issued.
    pub href: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedTimecode {
    #[serde(rename = "_id")]
    pub id: String,
    pub time_start: f64,
    pub time_end: f64,
    pub title: String,
    pub html: String,
}

#[derive(Debug, Deserialize)]
pub struct ActiveQuery {
    pub t: f64,
}

#[derive(Debug, Default, Deserialize)]
struct ResolveRequest {
    path: Option<String>,
}

pub async fn list_markups(State(state): State<AppState>) -> ApiResult<Json<Vec<MarkupSummary>>> {
    Ok(Json(state.markups.list().await?))
}

pub async fn get_markup(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MarkupView>> {
    let markup = state.markups.load(&id).await?;

    let href = match state.blobs.resolve_download_url(&markup.video_path).await {
        Ok(url) => Some(url.as_str().to_string()),
        Err(e) => {
            debug!(id = %id, error = %e, "no video link");
            None
        }
    };

    Ok(Json(MarkupView {
        id: markup.id,
        title: markup.title,
        timecodes: markup.timecodes,
        href,
    }))
}

/// Timecodes active at playback position `t`, rendered in one pass.
pub async fn active_timecodes(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ActiveQuery>,
) -> ApiResult<Json<Vec<RenderedTimecode>>> {
    let markup = state.markups.load(&id).await?;
    let active = active_at(&markup.timecodes, query.t);
    Ok(Json(render_timecodes(&state, &active).await))
}

pub async fn rendered_timecodes(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<RenderedTimecode>>> {
    let markup = state.markups.load(&id).await?;
    let all: Vec<&Timecode> = markup.timecodes.iter().collect();
    Ok(Json(render_timecodes(&state, &all).await))
}

async fn render_timecodes(state: &AppState, timecodes: &[&Timecode]) -> Vec<RenderedTimecode> {
    let bodies: Vec<_> = timecodes.iter().map(|tc| &tc.body).collect();
    let trees = state.render.run_many(state.blobs.as_ref(), &bodies).await;

    timecodes
        .iter()
        .zip(trees)
        .map(|(tc, tree)| RenderedTimecode {
            id: tc.id.clone(),
            time_start: tc.time_start,
            time_end: tc.time_end,
            title: tc.title.clone(),
            html: tree.to_html(),
        })
        .collect()
}

/// Fresh download link for a stored path. Viewers call this too, so it
/// carries no admin check.
pub async fn resolve_download(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let request: ResolveRequest = serde_json::from_slice(&body).unwrap_or_default();
    let path = request
        .path
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing path".to_string()))?;

    let url = state
        .blobs
        .resolve_download_url(&LogicalPath::new(path))
        .await?;
    Ok(Json(json!({ "ok": true, "href": url.as_str() })))
}
