//! Trailing-edge debounce.

use crate::shaping::HasLen;
use std::time::{Duration, Instant};

/// Stabilizes a stream of values: the settled output takes the latest input
/// only once `delay` has elapsed without a newer one.
///
/// Empty inputs ([`HasLen::is_empty`]) cancel the pending flush without
/// scheduling a new one, freezing the settled output at its last non-empty
/// value. The guard keeps an empty batch from ever settling, so a stream
/// that drains to nothing does not clobber its final payload.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
    settled: Option<T>,
}

impl<T: HasLen> Debouncer<T> {
    /// Delay applied when none is given.
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            settled: None,
        }
    }

    /// Record an input observed at `now`.
    ///
    /// A non-empty input cancels the pending flush and reschedules it at
    /// `now + delay`; an empty input cancels it outright.
    pub fn submit(&mut self, value: T, now: Instant) {
        if value.is_empty() {
            self.pending = None;
            return;
        }
        self.pending = Some((value, now + self.delay));
    }

    /// The instant the pending flush is due, if one is scheduled.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    /// Settle the pending value if its deadline has passed.
    ///
    /// Returns the newly settled value; `None` when nothing was due.
    pub fn poll(&mut self, now: Instant) -> Option<&T> {
        let due = self.deadline()?;
        if now < due {
            return None;
        }

        let (value, _) = self.pending.take()?;
        self.settled = Some(value);
        self.settled.as_ref()
    }

    /// The current settled output.
    pub fn value(&self) -> Option<&T> {
        self.settled.as_ref()
    }
}

impl<T: HasLen> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}
