//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Relay handler and sessions produce:
//!     → logging.rs (structured log events, one span per session)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID and session ID flow through every session log line
//! - Credentials are never logged
//! - Metrics are cheap (atomic increments) and off by default

pub mod logging;
pub mod metrics;
