//! Server-Sent Events endpoint pushing reload notifications to browsers.

use crate::reload::script::SOURCE_CHANGE_EVENT;
use crate::reload::{Broadcaster, Subscription};
use axum::{
    extract::State,
    http::header,
    response::{sse::Event, IntoResponse, Sse},
};
use serde::Serialize;
use std::sync::Arc;
use tokio_stream::Stream;
use tokio_util::sync::CancellationToken;

/// State shared by every streaming connection.
#[derive(Clone)]
pub struct ReloadState {
    pub broadcaster: Arc<Broadcaster>,
    /// Fires on server shutdown; ends every open stream.
    pub shutdown: CancellationToken,
}

/// Payload of a `sourcechange` event. Clients only care that it arrived.
#[derive(Debug, Default, Serialize)]
pub struct SourceChange {}

/// Handle one event-stream connection.
///
/// Subscribes on entry; the subscription is released when the stream is
/// dropped, whether the client went away or the server is shutting down.
pub async fn handle_sse(State(state): State<ReloadState>) -> impl IntoResponse {
    let subscription = state.broadcaster.subscribe();
    tracing::info!(
        subscriber = ?subscription.id(),
        clients = state.broadcaster.subscriber_count(),
        "reload client connected"
    );

    let stream = source_change_stream(subscription, state.shutdown.clone());

    (
        [
            (header::CONNECTION, "keep-alive"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        Sse::new(stream),
    )
}

/// Stream one `sourcechange` event per notification until the subscription
/// is closed or `shutdown` fires.
pub fn source_change_stream(
    mut subscription: Subscription,
    shutdown: CancellationToken,
) -> impl Stream<Item = Result<Event, axum::Error>> {
    let id = subscription.id();
    async_stream::stream! {
        loop {
            let received = tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::debug!(subscriber = ?id, "stream closed by shutdown");
                    None
                }
                received = subscription.recv() => received,
            };

            match received {
                Some(()) => {
                    yield Event::default()
                        .event(SOURCE_CHANGE_EVENT)
                        .json_data(SourceChange::default());
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_stream::StreamExt;

    fn state() -> ReloadState {
        ReloadState {
            broadcaster: Arc::new(Broadcaster::new()),
            shutdown: CancellationToken::new(),
        }
    }

    #[tokio::test]
    async fn test_response_headers() {
        let state = state();
        let response = handle_sse(State(state.clone())).await.into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
        assert_eq!(headers[header::CONNECTION], "keep-alive");
        assert_eq!(state.broadcaster.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_notification_is_framed_as_sourcechange() {
        let state = state();
        let response = handle_sse(State(state.clone())).await.into_response();
        let mut frames = Body::into_data_stream(response.into_body());

        state.broadcaster.notify();

        let frame = timeout(Duration::from_secs(1), frames.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(&frame[..], b"event: sourcechange\ndata: {}\n\n");
    }

    #[tokio::test]
    async fn test_dropping_response_unsubscribes() {
        let state = state();
        let response = handle_sse(State(state.clone())).await.into_response();
        assert_eq!(state.broadcaster.subscriber_count(), 1);

        drop(response);
        assert_eq!(state.broadcaster.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_ends_stream_and_unsubscribes() {
        let state = state();
        let subscription = state.broadcaster.subscribe();
        let stream = source_change_stream(subscription, state.shutdown.clone());
        tokio::pin!(stream);

        state.shutdown.cancel();
        let next = timeout(Duration::from_secs(1), stream.next()).await.unwrap();
        assert!(next.is_none());
        assert_eq!(state.broadcaster.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_unsubscribe_ends_stream() {
        let state = state();
        let subscription = state.broadcaster.subscribe();
        let id = subscription.id();
        let stream = source_change_stream(subscription, state.shutdown.clone());
        tokio::pin!(stream);

        state.broadcaster.notify();
        assert!(matches!(stream.next().await, Some(Ok(_))));

        state.broadcaster.unsubscribe(id);
        assert!(stream.next().await.is_none());
    }
}
