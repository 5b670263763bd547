use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

/// Turn a panic inside one request into a logged 500 so the process keeps
/// serving everyone else
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = err.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        message
    } else {
        "unknown panic payload"
    };

    error!(panic = detail, "Request handler panicked");
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}
