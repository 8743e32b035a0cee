//! Session-owned keep-alive timer.
//!
//! The timer is a plain value held by its session rather than a detached
//! task, so it cannot outlive the session or tick into a closed response.
//! Cancelling drops the underlying interval; a cancelled or never-armed timer
//! never fires again.

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

#[derive(Debug)]
pub struct KeepAlive {
    period: Duration,
    ticker: Option<Interval>,
}

impl KeepAlive {
    /// A timer that will fire every `period` once armed.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            ticker: None,
        }
    }

    /// Start ticking. The first tick is one full period from now.
    pub fn arm(&mut self) {
        let mut ticker = time::interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.ticker = Some(ticker);
    }

    /// Stop ticking. Returns false if the timer was already stopped.
    pub fn cancel(&mut self) -> bool {
        self.ticker.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for the next tick. Pending forever while not armed.
    pub async fn tick(&mut self) {
        match self.ticker.as_mut() {
            Some(ticker) => {
                ticker.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
