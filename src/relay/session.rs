//! One relay session: the data pump and its single cleanup routine.
//!
//! # Lifecycle
//! ```text
//! Open ──┬── upstream end     ──▶ Closed(UpstreamEnded)      + `closed` frame
//!        ├── upstream error   ──▶ Closed(UpstreamError(msg)) + `error` frame
//!        └── client gone      ──▶ Closed(ClientDisconnected) (no write)
//! ```
//!
//! Whichever signal arrives first wins the `Open → Closed` transition and
//! performs cleanup: keep-alive cancelled, upstream stream released,
//! downstream closed. Later signals are no-ops. A session dropped while still
//! open (aborted task, runtime shutdown) runs the same cleanup from `Drop`.
//!
//! A failed upstream connection never produces a `Session`; that outcome is
//! an HTTP error response from the handler.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::Instant;
use uuid::Uuid;

use crate::observability::metrics;
use crate::relay::error::error_chain;
use crate::relay::frame::RelayEvent;
use crate::relay::keepalive::KeepAlive;

/// Unique identifier for a session, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Why a streaming session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCause {
    UpstreamEnded,
    UpstreamError(String),
    ClientDisconnected,
}

impl TerminalCause {
    pub fn label(&self) -> &'static str {
        match self {
            TerminalCause::UpstreamEnded => "upstream_ended",
            TerminalCause::UpstreamError(_) => "upstream_error",
            TerminalCause::ClientDisconnected => "client_disconnected",
        }
    }

    /// In-band marker announced to a still-connected client.
    fn terminal_frame(&self) -> Option<RelayEvent> {
        match self {
            TerminalCause::UpstreamEnded => Some(RelayEvent::Closed),
            TerminalCause::UpstreamError(message) => Some(RelayEvent::Error {
                message: message.clone(),
            }),
            TerminalCause::ClientDisconnected => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Closed(TerminalCause),
}

impl SessionState {
    /// Single-assignment transition. Only the first call returns true.
    fn close(&mut self, cause: TerminalCause) -> bool {
        match self {
            SessionState::Open => {
                *self = SessionState::Closed(cause);
                true
            }
            SessionState::Closed(_) => false,
        }
    }
}

/// Write half of the downstream response body.
///
/// The body reads the paired receiver; hyper drops it when the client goes
/// away, which closes this side.
#[derive(Debug)]
pub struct Downstream {
    tx: Option<mpsc::Sender<Bytes>>,
}

impl Downstream {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx: Some(tx) }, rx)
    }

    pub fn is_open(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Queue a frame, waiting for room. False once the client is gone.
    async fn write(&mut self, frame: Bytes) -> bool {
        let Some(tx) = self.tx.as_ref() else {
            return false;
        };
        if tx.send(frame).await.is_ok() {
            return true;
        }
        self.tx = None;
        false
    }

    /// Resolves when the client side has gone away.
    async fn closed(&self) {
        if let Some(tx) = self.tx.as_ref() {
            tx.closed().await;
        }
    }

    fn close(&mut self) -> bool {
        self.tx.take().is_some()
    }
}

enum Step<T> {
    ClientGone,
    Upstream(Option<T>),
    KeepAliveDue,
}

pub struct Session<S> {
    id: SessionId,
    state: SessionState,
    upstream: Option<S>,
    keepalive: KeepAlive,
    downstream: Downstream,
    opened_at: Instant,
    forwarded_bytes: u64,
}

impl<S> Session<S> {
    /// Take ownership of a connected upstream stream. The keep-alive is armed
    /// by `run` once the `connected` frame is out.
    pub fn new(upstream: S, downstream: Downstream, keepalive_period: Duration) -> Self {
        metrics::record_session_opened();
        Self {
            id: SessionId::new(),
            state: SessionState::Open,
            upstream: Some(upstream),
            keepalive: KeepAlive::new(keepalive_period),
            downstream,
            opened_at: Instant::now(),
            forwarded_bytes: 0,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// Close the session for `cause`.
    ///
    /// Returns false, touching nothing, if the session was already closed.
    pub async fn terminate(&mut self, cause: TerminalCause) -> bool {
        let frame = cause.terminal_frame();
        if !self.release(cause) {
            return false;
        }
        if let Some(frame) = frame {
            if self.downstream.is_open() {
                self.downstream.write(frame.encode()).await;
            }
        }
        self.finish();
        true
    }

    fn release(&mut self, cause: TerminalCause) -> bool {
        if !self.state.close(cause) {
            return false;
        }
        self.keepalive.cancel();
        // Dropping the stream aborts the upstream connection.
        self.upstream = None;
        true
    }

    fn finish(&mut self) {
        self.downstream.close();
        let lifetime = self.opened_at.elapsed();
        if let SessionState::Closed(cause) = &self.state {
            metrics::record_session_closed(cause.label(), lifetime);
            tracing::info!(
                session_id = %self.id,
                cause = cause.label(),
                forwarded_bytes = self.forwarded_bytes,
                lifetime_ms = lifetime.as_millis() as u64,
                "Session closed"
            );
        }
    }
}

impl<S, E> Session<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: std::error::Error,
{
    /// Drive the session to completion and report why it ended.
    pub async fn run(mut self) -> TerminalCause {
        if self.is_open() {
            let cause = self.pump().await;
            self.terminate(cause).await;
        }
        match &self.state {
            SessionState::Closed(cause) => cause.clone(),
            SessionState::Open => TerminalCause::ClientDisconnected,
        }
    }

    async fn pump(&mut self) -> TerminalCause {
        if !self.downstream.write(RelayEvent::Connected.encode()).await {
            return TerminalCause::ClientDisconnected;
        }
        self.keepalive.arm();
        tracing::debug!(
            keepalive_secs = self.keepalive.period().as_secs(),
            "Session streaming"
        );

        loop {
            let Some(upstream) = self.upstream.as_mut() else {
                return TerminalCause::ClientDisconnected;
            };

            let step = tokio::select! {
                biased;
                _ = self.downstream.closed() => Step::ClientGone,
                item = upstream.next() => Step::Upstream(item),
                _ = self.keepalive.tick() => Step::KeepAliveDue,
            };

            match step {
                Step::ClientGone => return TerminalCause::ClientDisconnected,
                Step::Upstream(None) => return TerminalCause::UpstreamEnded,
                Step::Upstream(Some(Err(e))) => {
                    let message = error_chain(&e);
                    tracing::warn!(error = %message, "Upstream stream failed");
                    return TerminalCause::UpstreamError(message);
                }
                Step::Upstream(Some(Ok(chunk))) => {
                    let len = chunk.len();
                    if !self.downstream.write(chunk).await {
                        return TerminalCause::ClientDisconnected;
                    }
                    self.forwarded_bytes += len as u64;
                    metrics::record_forwarded_bytes(len);
                }
                Step::KeepAliveDue => {
                    if !self.downstream.is_open() {
                        self.keepalive.cancel();
                        continue;
                    }
                    if !self.downstream.write(RelayEvent::ping_now().encode()).await {
                        return TerminalCause::ClientDisconnected;
                    }
                    tracing::trace!("Keep-alive ping sent");
                }
            }
        }
    }
}

impl<S> Drop for Session<S> {
    fn drop(&mut self) {
        if self.release(TerminalCause::ClientDisconnected) {
            tracing::debug!(session_id = %self.id, "Session dropped while open");
            self.finish();
        }
    }
}
