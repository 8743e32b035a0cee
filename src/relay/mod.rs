//! SSE relay subsystem.
//!
//! # Data Flow
//! ```text
//! GET /sse-proxy?scrtUrl=..&conversationId=..&orgId=..&accessToken=..
//!     → params.rs (presence checks, lowercase id, default cursor)
//!     → upstream.rs (host policy, single GET, status classification)
//!         ✗ error.rs → 400 / 403 / upstream status / 500
//!     → session.rs (spawned task)
//!         connected frame → keep-alive armed → pump
//!         upstream chunk  → downstream, verbatim
//!         keep-alive tick → ping frame
//!         end / error     → closed / error frame → close
//!         client gone     → release upstream, no write
//! ```
//!
//! # Design Decisions
//! - One task per session; the session owns its upstream stream, keep-alive
//!   timer and downstream writer, and nothing is shared between sessions
//! - Termination is a single-assignment state transition, so concurrent
//!   terminal signals cannot double-write or double-close
//! - Downstream writes go through a bounded channel: a slow client slows the
//!   upstream read instead of growing memory
//! - No retries: the client reconnects, optionally with `lastEventId`

pub mod error;
pub mod frame;
pub mod handler;
pub mod keepalive;
pub mod params;
pub mod session;
pub mod upstream;

pub use error::RelayError;
pub use frame::RelayEvent;
pub use handler::relay_handler;
pub use params::{AccessToken, RelayParams, RelayQuery};
pub use session::{Downstream, Session, SessionId, SessionState, TerminalCause};
pub use upstream::UpstreamClient;
