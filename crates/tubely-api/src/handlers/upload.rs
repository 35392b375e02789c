//! Upload endpoints for the two asset classes.
//!
//! The body is taken raw rather than through an extractor, so the pipeline
//! decides when (and whether) the multipart stream is read.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap},
    Json,
};
use tubely_core::{AssetClass, Record};

use crate::error::HttpAppError;
use crate::pipeline::MultipartPayload;
use crate::state::AppState;

/// `POST /api/thumbnail_upload/{video_id}`, multipart field `thumbnail`
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<Record>, HttpAppError> {
    upload(state, AssetClass::Thumbnail, video_id, headers, body).await
}

/// `POST /api/video_upload/{video_id}`, multipart field `video`
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<Record>, HttpAppError> {
    upload(state, AssetClass::Video, video_id, headers, body).await
}

async fn upload(
    state: Arc<AppState>,
    class: AssetClass,
    video_id: String,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<Record>, HttpAppError> {
    let content_type = header_str(&headers, header::CONTENT_TYPE);
    let authorization = header_str(&headers, header::AUTHORIZATION);

    let mut payload = MultipartPayload::from_request(content_type, body);
    let record = state
        .pipeline
        .upload(class, &video_id, authorization, &mut payload)
        .await
        .map_err(|failure| {
            tracing::debug!(stage = %failure.stage, "Upload rejected");
            HttpAppError::from(failure)
        })?;

    Ok(Json(record))
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
