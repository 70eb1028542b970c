use super::ADMIN_HEADER;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use vidnote_document::LogicalPath;
use vidnote_store::naming::{image_path, video_path};
use vidnote_timeline::{Markup, MarkupPatch};

#[derive(Debug, Default, Deserialize)]
struct CheckRequest {
    password: Option<String>,
}

struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

fn authorize(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let expected = state
        .admin_password
        .as_deref()
        .ok_or(ApiError::NotConfigured)?;
    let given = headers.get(ADMIN_HEADER).and_then(|v| v.to_str().ok());

    if given != Some(expected) {
        return Err(ApiError::Unauthorized);
    }
    Ok(())
}

/// Password probe for the admin page.
pub async fn check(State(state): State<AppState>, body: Bytes) -> Response {
    let Some(expected) = state.admin_password.as_deref() else {
        return ApiError::NotConfigured.into_response();
    };
    let request: CheckRequest = serde_json::from_slice(&body).unwrap_or_default();

    if request.password.as_deref() == Some(expected) {
        Json(json!({ "ok": true })).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "ok": false }))).into_response()
    }
}

/// Read every multipart field, keeping the first `file` and the text of
/// `metadata`.
async fn read_form(mut multipart: Multipart) -> ApiResult<(Option<Upload>, Option<String>)> {
    let mut upload = None;
    let mut metadata = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") if upload.is_none() => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                upload = Some(Upload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            Some("metadata") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                metadata = Some(text);
            }
            _ => {}
        }
    }

    Ok((upload, metadata))
}

async fn publish_best_effort(state: &AppState, path: &LogicalPath) {
    if let Err(e) = state.blobs.publish(path).await {
        warn!(path = %path, error = %e, "publish failed; continuing");
    }
}

/// Upload a video and create its markup.
pub async fn create_markup(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    authorize(&state, &headers)?;

    let (upload, metadata) = read_form(multipart).await?;
    let (upload, metadata) = match (upload, metadata) {
        (Some(upload), Some(metadata)) => (upload, metadata),
        _ => return Err(ApiError::missing()),
    };
    let metadata: MarkupPatch = serde_json::from_str(&metadata)
        .map_err(|e| ApiError::BadRequest(format!("invalid metadata: {}", e)))?;

    let path = video_path(&state.video_folder, &upload.file_name);
    state.blobs.upload(&path, upload.bytes).await?;
    publish_best_effort(&state, &path).await;

    let title = metadata
        .title
        .filter(|t| !t.is_empty())
        .unwrap_or(upload.file_name);
    let mut markup = Markup::new(title, path.clone());
    markup.timecodes = metadata.timecodes.unwrap_or_default();
    markup.created_at = Some(Utc::now());

    let id = state.markups.save(markup).await?;
    info!(id = %id, path = %path, "markup created");

    Ok(Json(json!({ "ok": true, "path": path, "id": id })))
}

/// Upload an image for embedding in a timecode body.
pub async fn upload_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    authorize(&state, &headers)?;

    let upload = read_form(multipart)
        .await?
        .0
        .ok_or_else(|| ApiError::BadRequest("missing file".to_string()))?;

    let path = image_path(&state.image_folder, &upload.file_name);
    state.blobs.upload(&path, upload.bytes).await?;
    publish_best_effort(&state, &path).await;

    let href = match state.blobs.resolve_download_url(&path).await {
        Ok(url) => Some(url.as_str().to_string()),
        Err(e) => {
            warn!(path = %path, error = %e, "uploaded image has no download link yet");
            None
        }
    };

    Ok(Json(json!({ "ok": true, "href": href, "path": path })))
}

/// Replace a markup's title and/or timecode list.
pub async fn update_markup(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    authorize(&state, &headers)?;

    let mut patch: MarkupPatch = if body.iter().all(u8::is_ascii_whitespace) {
        MarkupPatch::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid body: {}", e)))?
    };
    patch.title = patch.title.filter(|t| !t.is_empty());
    if patch.is_empty() {
        return Err(ApiError::missing());
    }

    state.markups.update(&id, patch).await?;
    info!(id = %id, "markup updated");
    Ok(Json(json!({ "ok": true })))
}

pub async fn delete_markup(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    authorize(&state, &headers)?;

    state.markups.delete(&id).await?;
    info!(id = %id, "markup deleted");
    Ok(Json(json!({ "ok": true })))
}
