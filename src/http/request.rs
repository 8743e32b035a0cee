//! Request identification.
//!
//! # Responsibilities
//! - Assign a UUID `x-request-id` to every inbound request lacking one
//! - Echo it on the response
//! - Let handlers read it back for log correlation
//! - Build the per-request trace span from method, path and request ID only;
//!   the query string carries the access token and never enters a span

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, Request};
use tracing::Span;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer that stamps missing request IDs.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuid)
}

/// Layer that copies the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}

/// Span for `TraceLayer::make_span_with`.
pub fn request_span(req: &Request<Body>) -> Span {
    tracing::debug_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %req.headers().request_id(),
    )
}

pub trait RequestIdExt {
    /// The request ID, or `"unknown"` outside the request-id layers.
    fn request_id(&self) -> &str;
}

impl RequestIdExt for HeaderMap {
    fn request_id(&self) -> &str {
        self.get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}
