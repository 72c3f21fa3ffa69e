//! Server-error responses for failures scoped to a single request.

use axum::{
    body::Body,
    http::{header, HeaderValue, Response, StatusCode},
};
use std::any::Any;
use std::backtrace::Backtrace;
use std::fmt::Display;

/// Whether the `DEBUG` environment variable asks for detailed error bodies.
pub fn debug_enabled() -> bool {
    matches!(std::env::var("DEBUG").as_deref(), Ok("1") | Ok("true"))
}

/// Build a 500 response for `err` and log it.
///
/// With `DEBUG=1` the body carries the error and a backtrace, otherwise only
/// the canonical reason phrase.
pub fn server_error(err: &dyn Display) -> Response<Body> {
    tracing::error!(error = %err, "server error");

    let body = if debug_enabled() {
        format!("{}\n{}", err, Backtrace::force_capture())
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
            .canonical_reason()
            .unwrap_or("Internal Server Error")
            .to_string()
    };

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

/// Response for a handler that panicked.
///
/// The connection is marked non-reusable since the panic may have left it
/// mid-response.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let message = panic_message(panic.as_ref());
    let mut response = server_error(&format_args!("handler panicked: {message}"));
    response
        .headers_mut()
        .insert(header::CONNECTION, HeaderValue::from_static("close"));
    response
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    }
}
