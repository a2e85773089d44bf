//! Instrumentation adapters turning host signals into tracked events.
//!
//! Each adapter covers one signal family: [`ClickTracker`] for discrete
//! interactions, [`MouseTracker`] for the continuous pointer stream (shaped
//! through the throttler before dispatch), [`RouteTracker`] for navigation.
//! Adapters are built by [`Tracker`](crate::tracker::Tracker) accessors so
//! they share its session, dispatcher, stats, and viewport. All of them
//! signal activity before dispatching, keeping the session alive while the
//! user is interacting.

mod click;
mod mouse;
mod route;

pub use click::ClickTracker;
pub use mouse::{MouseSample, MouseTracker};
pub use route::RouteTracker;

use std::sync::{Arc, RwLock};

use tokio::runtime::Handle;

use crate::clock::Clock;
use crate::dispatch::EventDispatcher;
use crate::event::{InteractionKind, Resolution};
use crate::session::SessionManager;
use crate::stats::TrackerStats;

/// Adapter errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterError {
    /// The adapter cannot instrument this interaction kind.
    Unsupported(InteractionKind),
}

impl std::fmt::Display for AdapterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdapterError::Unsupported(kind) => {
                write!(f, "unsupported interaction kind: {kind}")
            }
        }
    }
}

impl std::error::Error for AdapterError {}

/// Everything an adapter borrows from its owning tracker.
#[derive(Clone)]
pub(crate) struct AdapterContext {
    pub(crate) session: Arc<SessionManager>,
    pub(crate) dispatcher: Arc<EventDispatcher>,
    pub(crate) stats: Arc<TrackerStats>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) viewport: Arc<RwLock<Resolution>>,
    pub(crate) handle: Handle,
}

impl AdapterContext {
    /// Route one activity signal through the session manager, keeping the
    /// rotation counter in step.
    pub(crate) fn signal_activity(&self) {
        self.stats.record_activity_signal();
        if self.session.record_activity() {
            self.stats.record_session_rotation();
        }
    }
}

/// Monotonic now for shaper bookkeeping.
///
/// Taken from the tokio clock rather than `std` so paused-time tests drive
/// shaper deadlines and armed sleeps from the same timeline; outside a test
/// runtime the two clocks agree.
pub(crate) fn shaper_now() -> std::time::Instant {
    tokio::time::Instant::now().into_std()
}
