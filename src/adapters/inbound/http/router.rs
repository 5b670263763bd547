use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use super::{
    handlers::{readiness, route_not_found, stream_video, upload_video},
    middleware::{correlation_span, handle_panic},
};
use crate::{app::Readiness, config::LogTags, ports::storage::VideoStore};

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub video_store: Arc<dyn VideoStore>,
    pub readiness: Arc<Readiness>,
    pub log_tags: LogTags,
}

impl AppState {
    /// State with a fresh readiness flag, not yet ready
    pub fn new(video_store: Arc<dyn VideoStore>, log_tags: LogTags) -> Self {
        Self {
            video_store,
            readiness: Arc::new(Readiness::new()),
            log_tags,
        }
    }
}

/// Create the main application router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let log_tags = state.log_tags.clone();

    Router::new()
        .route("/readiness", get(readiness))
        .route("/video", get(stream_video))
        .route("/upload", post(upload_video))
        .fallback(route_not_found)
        .method_not_allowed_fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn_with_state(log_tags, correlation_span))
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(handle_panic)),
        )
        .with_state(state)
}
