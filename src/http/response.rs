//! Event-stream response construction.
//!
//! # Design Decisions
//! - Headers are fixed at construction; once returned they are committed
//! - The body is fed from the session's channel, so dropping the body (client
//!   disconnect) is what signals the session to stop
//! - `no-transform` and `X-Accel-Buffering: no` keep intermediaries from
//!   buffering or compressing the stream

use std::any::Any;
use std::convert::Infallible;

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tokio::sync::mpsc;

pub const TEXT_EVENT_STREAM: &str = "text/event-stream";
pub const X_ACCEL_BUFFERING: &str = "x-accel-buffering";

/// A 200 `text/event-stream` response streaming `frames` until the sender
/// side closes.
pub fn event_stream(mut frames: mpsc::Receiver<Bytes>) -> Response {
    let body = async_stream::stream! {
        while let Some(frame) = frames.recv().await {
            yield Ok::<Bytes, Infallible>(frame);
        }
    };

    let mut response = Response::new(Body::from_stream(body));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_EVENT_STREAM));
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-transform"),
    );
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(X_ACCEL_BUFFERING, HeaderValue::from_static("no"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}

/// 500 for a handler that panicked, matching the transport-failure body.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".to_string());
    tracing::error!(panic = %detail, "Relay handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Error in SSE proxy: internal error",
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn commits_streaming_headers_and_relays_frames() {
        let (tx, rx) = mpsc::channel(4);
        let response = event_stream(rx);

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], TEXT_EVENT_STREAM);
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache, no-transform");
        assert_eq!(headers[header::CONNECTION], "keep-alive");
        assert_eq!(headers[X_ACCEL_BUFFERING], "no");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        tx.send(Bytes::from_static(b"event: a\n\n")).await.unwrap();
        tx.send(Bytes::from_static(b"data: b\n\n")).await.unwrap();
        drop(tx);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, Bytes::from_static(b"event: a\n\ndata: b\n\n"));
    }

    #[tokio::test]
    async fn panic_becomes_plain_500() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_ne!(response.headers()[header::CONTENT_TYPE], TEXT_EVENT_STREAM);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, "Error in SSE proxy: internal error");
    }
}
