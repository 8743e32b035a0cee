//! SSE relay library.
//!
//! Opens an upstream server-sent-events stream on a browser's behalf and
//! relays it back byte-for-byte, adding `connected`, `ping`, `closed` and
//! `error` lifecycle frames.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod security;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
