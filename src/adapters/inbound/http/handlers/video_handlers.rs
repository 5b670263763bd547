use axum::{
    Json,
    body::Body,
    extract::{Query, State},
    http::{
        HeaderMap, StatusCode,
        header::{CONTENT_LENGTH, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use futures::{StreamExt, TryStreamExt};
use tracing::{error, info, warn};

use crate::{
    adapters::inbound::http::{
        dto::{ErrorResponseDto, VideoQueryDto},
        router::AppState,
    },
    domain::{
        errors::StorageError,
        models::{StoredVideo, VideoUpload},
        value_objects::ObjectKey,
    },
};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Handle `GET /video?id=<key>`: stream a stored video back to the caller
pub async fn stream_video(
    State(app_state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let query = VideoQueryDto::from_pairs(params);

    // A missing id is answered with 200 and an error payload
    let Some(key) = query.id.and_then(|id| ObjectKey::new(id).ok()) else {
        warn!("Video requested without an id");
        return (StatusCode::OK, Json(ErrorResponseDto::missing_video_id())).into_response();
    };

    match app_state.video_store.fetch(&key).await {
        Ok(video) => video_response(video),
        Err(StorageError::ObjectNotFound { key }) => {
            info!(key = %key, "Video not found");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(e) => {
            error!(key = %key, error = ?e, "Failed to fetch video");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn video_response(video: StoredVideo) -> Response {
    let content_type = video.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE);

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type);
    if let Some(content_length) = video.content_length {
        builder = builder.header(CONTENT_LENGTH, content_length);
    }

    match builder.body(Body::from_stream(video.body)) {
        Ok(response) => response,
        Err(e) => {
            error!(key = %video.key, error = %e, "Failed to build video response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Handle `POST /upload`: stream the request body into storage
///
/// The key, content type and length come from the `id`, `content-type` and
/// `content-length` request headers.
pub async fn upload_video(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> StatusCode {
    let Some(key) = header_str(&headers, "id").and_then(|id| ObjectKey::new(id).ok()) else {
        error!("Upload rejected: missing 'id' header");
        return StatusCode::INTERNAL_SERVER_ERROR;
    };

    let content_length = match header_str(&headers, CONTENT_LENGTH.as_str()) {
        None => None,
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(length) => Some(length),
            Err(_) => {
                error!(
                    key = %key,
                    content_length = raw,
                    "Upload rejected: invalid content-length header"
                );
                return StatusCode::INTERNAL_SERVER_ERROR;
            }
        },
    };

    let upload = VideoUpload {
        key,
        content_type: header_str(&headers, CONTENT_TYPE.as_str()).map(str::to_string),
        content_length,
    };
    let key = upload.key.clone();
    let body = body.into_data_stream().map_err(std::io::Error::other).boxed();

    match app_state.video_store.store(upload, body).await {
        Ok(()) => {
            info!(key = %key, ?content_length, "Stored video");
            StatusCode::OK
        }
        Err(e) => {
            error!(key = %key, error = ?e, "Failed to store video");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}
