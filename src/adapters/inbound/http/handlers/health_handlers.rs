use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::Html,
};
use tracing::error;

use crate::adapters::inbound::http::router::AppState;

/// Handle `GET /readiness`: 200 once the listener is bound, 500 before
pub async fn readiness(State(app_state): State<AppState>) -> StatusCode {
    if app_state.readiness.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Fallback for every unmatched route
pub async fn route_not_found(method: Method, uri: Uri) -> (StatusCode, Html<String>) {
    error!(url = %uri, "No route for {} {}", method, uri);
    (
        StatusCode::NOT_FOUND,
        Html(format!("<pre>Cannot {} {}</pre>", method, uri)),
    )
}
