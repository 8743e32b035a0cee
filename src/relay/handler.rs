//! `GET /sse-proxy` handler.

use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use tracing::Instrument;

use crate::http::request::RequestIdExt;
use crate::http::response::event_stream;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::relay::error::RelayError;
use crate::relay::params::{RelayParams, RelayQuery};
use crate::relay::session::{Downstream, Session};

/// Validate, connect upstream, and hand the stream to a session task.
///
/// Errors before streaming are plain HTTP responses; once this returns the
/// 200 event-stream response, the session task owns everything.
pub async fn relay_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RelayQuery>,
) -> Response {
    let request_id = headers.request_id().to_string();

    match open_session(&state, &request_id, query).await {
        Ok(response) => {
            metrics::record_request("streaming");
            response
        }
        Err(err) => {
            metrics::record_request(err.outcome());
            match &err {
                RelayError::UpstreamRejected { status, .. } => {
                    metrics::record_upstream_rejection(status.as_u16());
                    tracing::warn!(
                        request_id = %request_id,
                        status = %status,
                        "Upstream rejected relay request"
                    );
                }
                RelayError::Transport(message) => {
                    tracing::error!(
                        request_id = %request_id,
                        error = %message,
                        "Upstream unreachable"
                    );
                }
                other => {
                    tracing::warn!(
                        request_id = %request_id,
                        error = %other,
                        "Relay request refused"
                    );
                }
            }
            err.into_response()
        }
    }
}

async fn open_session(
    state: &AppState,
    request_id: &str,
    query: RelayQuery,
) -> Result<Response, RelayError> {
    let params = RelayParams::try_from(query)?;
    let upstream = state.upstream.connect(&params).await?;

    let (downstream, frames) = Downstream::channel(state.session.downstream_buffer);
    let session = Session::new(
        Box::pin(upstream.bytes_stream()),
        downstream,
        Duration::from_secs(state.session.keepalive_secs),
    );

    let span = tracing::info_span!(
        "session",
        session_id = %session.id(),
        request_id = %request_id,
        conversation_id = %params.conversation_id,
    );
    span.in_scope(|| tracing::info!(scrt_url = %params.scrt_url, "Relay session opened"));
    tokio::spawn(session.run().instrument(span));

    Ok(event_stream(frames))
}
