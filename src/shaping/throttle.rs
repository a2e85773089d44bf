//! Window-anchored throttle.

use std::time::{Duration, Instant};

/// Lets the latest input through at most once per `limit` window, measured
/// from the last successful update.
///
/// Submitting replaces the pending value but never moves the deadline: it
/// stays anchored at `last update + limit` however many inputs arrive, so a
/// busy stream still flushes on the window boundary (this is not a
/// reset-on-activity debounce). A deadline already in the past fires on the
/// next poll, which gives an immediate update after a quiet stretch.
#[derive(Debug)]
pub struct Throttler<T> {
    limit: Duration,
    last_ran: Instant,
    pending: Option<T>,
}

impl<T> Throttler<T> {
    /// Create a throttler whose first window starts at `now`.
    pub fn new(limit: Duration, now: Instant) -> Self {
        Self {
            limit,
            last_ran: now,
            pending: None,
        }
    }

    /// Record an input observed at `now`, replacing any pending one.
    pub fn submit(&mut self, value: T, _now: Instant) {
        self.pending = Some(value);
    }

    /// The instant the pending update is due, if an input is waiting.
    ///
    /// May already be in the past; the next poll then fires immediately.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|_| self.last_ran + self.limit)
    }

    /// Let the pending value through if a full window has elapsed since the
    /// last update, resetting the window to the fire time.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.is_none() {
            return None;
        }
        if now.duration_since(self.last_ran) < self.limit {
            return None;
        }

        self.last_ran = now;
        self.pending.take()
    }

    /// Whether an input is waiting for the window boundary.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
