//! Relay error taxonomy and its HTTP mapping.
//!
//! Every variant here is raised before streaming headers are committed, so
//! each maps to an ordinary HTTP response. Failures after that point travel
//! in-band as an `error` frame instead (see `session`).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    /// One or more required query parameters are absent or empty.
    #[error("Missing required parameters: {}", .0.join(", "))]
    MissingParameters(Vec<&'static str>),

    /// A parameter is present but cannot be used as given.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// `scrtUrl` resolves to a host outside the configured allow-list.
    #[error("Upstream host not allowed: {0}")]
    HostNotAllowed(String),

    /// The upstream answered with a non-success status.
    #[error("Upstream rejected the request with status {status}")]
    UpstreamRejected { status: StatusCode, body: String },

    /// The upstream could not be reached or its error body could not be read.
    #[error("Error in SSE proxy: {0}")]
    Transport(String),
}

impl RelayError {
    pub fn transport(err: reqwest::Error) -> Self {
        RelayError::Transport(error_chain(&err))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingParameters(_) | RelayError::InvalidParameter { .. } => {
                StatusCode::BAD_REQUEST
            }
            RelayError::HostNotAllowed(_) => StatusCode::FORBIDDEN,
            RelayError::UpstreamRejected { status, .. } => *status,
            RelayError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metric label for the request outcome.
    pub fn outcome(&self) -> &'static str {
        match self {
            RelayError::MissingParameters(_) | RelayError::InvalidParameter { .. } => {
                "invalid_request"
            }
            RelayError::HostNotAllowed(_) => "host_not_allowed",
            RelayError::UpstreamRejected { .. } => "upstream_rejected",
            RelayError::Transport(_) => "transport_error",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            RelayError::UpstreamRejected { body, .. } => (status, body).into_response(),
            other => (status, other.to_string()).into_response(),
        }
    }
}

/// Render an error with its whole `source()` chain, outermost first.
///
/// Transport errors from the HTTP client keep the useful part (connection
/// refused, DNS failure) in their sources.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
