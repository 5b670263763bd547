use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, error_span};

use crate::config::LogTags;

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Correlation identifier propagated from the `x-correlation-id` header
///
/// Empty when the caller did not send one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let id = headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Run each request inside a span carrying `app`, `service` and `requestId`,
/// so every record logged while handling it is tagged
///
/// The span sits at error level so it stays enabled under any filter that
/// lets a record through.
pub async fn correlation_span(
    State(tags): State<LogTags>,
    mut request: Request,
    next: Next,
) -> Response {
    let correlation_id = CorrelationId::from_headers(request.headers());

    let span = error_span!(
        "request",
        app = %tags.app,
        service = %tags.service,
        requestId = %correlation_id,
    );
    request.extensions_mut().insert(correlation_id);

    next.run(request).instrument(span).await
}
