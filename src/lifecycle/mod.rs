//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging/metrics → Bind → Serve
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     Stop accepting → Drain → grace deadline → drop remaining sessions
//! ```
//!
//! # Design Decisions
//! - SSE sessions never end on their own, so draining is bounded by a grace
//!   deadline; a dropped session still runs its cleanup path

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
