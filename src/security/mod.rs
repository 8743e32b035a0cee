//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (preflight + response headers, applied as a layer)
//!     → relay handler
//!         → upstream_policy.rs (scrtUrl host must be allow-listed)
//!         → upstream request
//! ```
//!
//! # Design Decisions
//! - Fail closed: a host outside a configured allow-list never sees a request
//! - The bearer credential is passed through, never inspected

pub mod cors;
pub mod upstream_policy;

pub use cors::cors_layer;
pub use upstream_policy::HostPolicy;
