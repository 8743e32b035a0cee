//! Synthetic SSE frames emitted by the relay itself.
//!
//! Upstream data is never reframed; only these four lifecycle events are
//! written with `event: <type>\ndata: <json>\n\n` framing.

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// First frame of every session, before any upstream data.
    Connected,
    /// Keep-alive tick.
    Ping { time: DateTime<Utc> },
    /// Upstream ended the stream normally.
    Closed,
    /// Upstream stream broke after headers were committed.
    Error { message: String },
}

impl RelayEvent {
    pub fn ping_now() -> Self {
        RelayEvent::Ping { time: Utc::now() }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RelayEvent::Connected => "connected",
            RelayEvent::Ping { .. } => "ping",
            RelayEvent::Closed => "closed",
            RelayEvent::Error { .. } => "error",
        }
    }

    fn data(&self) -> Value {
        match self {
            RelayEvent::Connected => json!({ "status": "connected" }),
            RelayEvent::Ping { time } => {
                json!({ "time": time.to_rfc3339_opts(SecondsFormat::Millis, true) })
            }
            RelayEvent::Closed => json!({ "status": "closed_by_server" }),
            RelayEvent::Error { message } => json!({ "error": message }),
        }
    }

    /// Wire form of the frame.
    pub fn encode(&self) -> Bytes {
        Bytes::from(format!("event: {}\ndata: {}\n\n", self.name(), self.data()))
    }
}
