//! Response-rewriting middleware that injects the reload listener into HTML.
//!
//! A response moves through explicit stages:
//!
//! - [`Stage::Passthrough`]: headers rule out rewriting (range request,
//!   non-HTML, encoded body). The body streams through untouched.
//! - [`Stage::Buffering`]: an HTML candidate whose body has been collected in
//!   memory.
//! - committed: [`Stage::commit`] consumes the stage and yields the final
//!   response, so nothing can write headers or body after it.
//!
//! HEAD requests are served as GET underneath and lose their body at the
//! end, so they advertise the same Content-Length a GET would.

use crate::reload::failure::server_error;
use crate::reload::Injection;
use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{header, response::Parts, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use memchr::memmem;
use thiserror::Error;

/// Marker the snippet is inserted in front of.
pub const BODY_CLOSE_TAG: &[u8] = b"</body>";

const HTML_CONTENT_TYPE: &str = "text/html";

/// Failures while rewriting one response.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// The wrapped handler's body could not be read to the end.
    #[error("failed to buffer response body: {0}")]
    BodyRead(#[source] axum::Error),

    /// The upstream Content-Length header is not a valid length.
    #[error("could not parse Content-Length value {0:?}")]
    InvalidContentLength(String),
}

/// Why a response was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassthroughReason {
    RangeRequest,
    NotHtml,
    Encoded,
    NoBodyCloseTag,
}

/// A response on its way through the middleware.
#[derive(Debug)]
pub enum Stage {
    Passthrough {
        response: Response,
        reason: PassthroughReason,
    },
    Buffering {
        parts: Parts,
        body: Bytes,
    },
}

impl Stage {
    /// Inspect the response headers and buffer the body if it may need
    /// rewriting.
    pub async fn begin(response: Response, range_requested: bool) -> Result<Self, RewriteError> {
        if let Some(reason) = passthrough_reason(response.headers(), range_requested) {
            return Ok(Stage::Passthrough { response, reason });
        }

        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(RewriteError::BodyRead)?;

        Ok(Stage::Buffering { parts, body })
    }

    /// Why the response will pass through unchanged, if it will.
    pub fn passthrough_reason(&self) -> Option<PassthroughReason> {
        match self {
            Stage::Passthrough { reason, .. } => Some(*reason),
            Stage::Buffering { body, .. } => {
                find_body_close(body).is_none().then_some(PassthroughReason::NoBodyCloseTag)
            }
        }
    }

    /// Produce the final response, inserting `injection` before the first
    /// closing body tag of a buffered HTML document.
    pub fn commit(self, injection: &Injection) -> Result<Response, RewriteError> {
        match self {
            Stage::Passthrough { response, .. } => Ok(response),
            Stage::Buffering { mut parts, body } => {
                let Some(at) = find_body_close(&body) else {
                    return Ok(Response::from_parts(parts, Body::from(body)));
                };

                adjust_content_length(&mut parts.headers, injection.len())?;

                let mut rewritten = Vec::with_capacity(body.len() + injection.len());
                rewritten.extend_from_slice(&body[..at]);
                rewritten.extend_from_slice(injection.as_bytes());
                rewritten.extend_from_slice(&body[at..]);

                Ok(Response::from_parts(parts, Body::from(rewritten)))
            }
        }
    }
}

/// Axum middleware wrapping the static file service.
///
/// Use with `axum::middleware::from_fn_with_state(injection, inject_reload)`.
pub async fn inject_reload(
    State(injection): State<Injection>,
    mut request: Request,
    next: Next,
) -> Response {
    let range_requested = request.headers().contains_key(header::RANGE);
    let path = request.uri().path().to_owned();
    let head = request.method() == Method::HEAD;
    if head {
        *request.method_mut() = Method::GET;
    }
    let response = next.run(request).await;

    let outcome = match Stage::begin(response, range_requested).await {
        Ok(stage) => {
            if let Some(reason) = stage.passthrough_reason() {
                tracing::trace!(%path, ?reason, "response passed through");
            } else {
                tracing::debug!(%path, "injecting reload script");
            }
            stage.commit(&injection)
        }
        Err(err) => Err(err),
    };

    let response = outcome.unwrap_or_else(|err| server_error(&err));
    if head {
        let (parts, _) = response.into_parts();
        return Response::from_parts(parts, Body::empty());
    }
    response
}

fn passthrough_reason(headers: &HeaderMap, range_requested: bool) -> Option<PassthroughReason> {
    if range_requested {
        return Some(PassthroughReason::RangeRequest);
    }

    let is_html = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().contains(HTML_CONTENT_TYPE));
    if !is_html {
        return Some(PassthroughReason::NotHtml);
    }

    let encoded = headers
        .get(header::CONTENT_ENCODING)
        .is_some_and(|v| v.as_bytes() != b"identity");
    if encoded {
        return Some(PassthroughReason::Encoded);
    }

    None
}

fn find_body_close(body: &[u8]) -> Option<usize> {
    memmem::find(body, BODY_CLOSE_TAG)
}

/// Grow a declared Content-Length by `extra` bytes. Absent headers stay absent.
fn adjust_content_length(headers: &mut HeaderMap, extra: usize) -> Result<(), RewriteError> {
    let Some(value) = headers.get(header::CONTENT_LENGTH) else {
        return Ok(());
    };

    let declared: usize = value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .ok_or_else(|| {
            RewriteError::InvalidContentLength(String::from_utf8_lossy(value.as_bytes()).into_owned())
        })?;

    let adjusted = declared.checked_add(extra).ok_or_else(|| {
        RewriteError::InvalidContentLength(String::from_utf8_lossy(value.as_bytes()).into_owned())
    })?;

    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(adjusted));
    Ok(())
}
