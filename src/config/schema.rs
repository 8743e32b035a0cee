//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files, and
//! every section falls back to its defaults so an empty file is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the SSE relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind host, port, drain grace).
    pub listener: ListenerConfig,

    /// Cross-origin policy applied to every route.
    pub cors: CorsConfig,

    /// Upstream event endpoint settings.
    pub upstream: UpstreamConfig,

    /// Per-session stream tuning.
    pub session: SessionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port. Overridden by the `PORT` environment variable.
    pub port: u16,

    /// Seconds to wait for open sessions after a shutdown signal before
    /// dropping them.
    pub shutdown_grace_secs: u64,
}

impl ListenerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            shutdown_grace_secs: 5,
        }
    }
}

/// Cross-origin resource sharing policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. Empty or `*` allows any origin.
    pub allowed_origins: Vec<String>,

    /// Allowed request methods.
    pub allowed_methods: Vec<String>,

    /// Allowed request headers.
    pub allowed_headers: Vec<String>,

    /// Send `Access-Control-Allow-Credentials: true`.
    pub allow_credentials: bool,

    /// Preflight cache lifetime in seconds.
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allowed_methods: vec!["GET".to_string(), "POST".to_string()],
            allowed_headers: vec![
                "Content-Type".to_string(),
                "Authorization".to_string(),
                "X-Requested-With".to_string(),
                "Last-Event-ID".to_string(),
            ],
            allow_credentials: true,
            max_age_secs: 86_400,
        }
    }
}

/// Upstream event endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// URL scheme used to reach `scrtUrl` (`https` in production).
    pub scheme: String,

    /// Path of the upstream SSE endpoint.
    pub path: String,

    /// TCP/TLS connect timeout in seconds. `0` leaves the attempt unbounded.
    pub connect_timeout_secs: u64,

    /// Host suffixes `scrtUrl` must match. Empty allows any host.
    pub allowed_host_suffixes: Vec<String>,
}

impl UpstreamConfig {
    pub fn connect_timeout(&self) -> Option<Duration> {
        (self.connect_timeout_secs > 0).then(|| Duration::from_secs(self.connect_timeout_secs))
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            path: "/eventrouter/v1/sse".to_string(),
            connect_timeout_secs: 10,
            allowed_host_suffixes: Vec::new(),
        }
    }
}

/// Per-session stream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Interval between synthetic `ping` events in seconds.
    pub keepalive_secs: u64,

    /// Frames buffered between the pump and a slow client before the pump
    /// stops reading upstream.
    pub downstream_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            keepalive_secs: 30,
            downstream_buffer: 32,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines for development.
    #[default]
    Pretty,
    /// One JSON object per line for log aggregation.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins if set.
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
