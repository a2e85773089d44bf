//! Navigation adapter.

use tokio::task::JoinHandle;
use tracing::debug;

use crate::event::TrackerEvent;
use crate::trackers::AdapterContext;

/// Records one event per navigation signal.
///
/// Deduplication is the host router's concern: every call is taken as a
/// real navigation and dispatched.
pub struct RouteTracker {
    context: AdapterContext,
}

impl RouteTracker {
    pub(crate) fn new(context: AdapterContext) -> Self {
        Self { context }
    }

    /// Record a navigation to `path`.
    pub fn observe(&self, path: &str) -> JoinHandle<()> {
        self.context.signal_activity();
        self.context.stats.record_route_change();
        debug!(route = path, "route change recorded");

        let event = TrackerEvent::navigation(self.context.clock.now_millis(), path);
        self.context.dispatcher.send(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::dispatch::EventDispatcher;
    use crate::event::Resolution;
    use crate::session::SessionManager;
    use crate::stats::TrackerStats;
    use crate::storage::MemoryStorage;
    use crate::testutil::RecordingTransport;
    use std::sync::{Arc, RwLock};
    use tokio::runtime::Handle;

    fn context(transport: Arc<RecordingTransport>) -> AdapterContext {
        let session = Arc::new(SessionManager::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(ManualClock::starting_now()),
        ));
        let stats = Arc::new(TrackerStats::new());
        let dispatcher = Arc::new(EventDispatcher::new(
            session.clone(),
            transport,
            stats.clone(),
            Handle::current(),
        ));
        AdapterContext {
            session,
            dispatcher,
            stats,
            clock: Arc::new(ManualClock::starting_now()),
            viewport: Arc::new(RwLock::new(Resolution::default())),
            handle: Handle::current(),
        }
    }

    #[tokio::test]
    async fn test_observe_dispatches_route_event() {
        let transport = Arc::new(RecordingTransport::default());
        let context = context(transport.clone());
        let tracker = RouteTracker::new(context.clone());

        tracker.observe("/checkout").await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        let json = serde_json::to_value(&calls[0].1[0]).unwrap();
        assert_eq!(json["dimensions"]["route"], "/checkout");
        assert_eq!(context.stats.snapshot().route_changes_recorded, 1);
    }

    #[tokio::test]
    async fn test_every_observation_dispatches() {
        let transport = Arc::new(RecordingTransport::default());
        let tracker = RouteTracker::new(context(transport.clone()));

        // Repeated paths are the router's business, not ours.
        tracker.observe("/home").await.unwrap();
        tracker.observe("/home").await.unwrap();
        tracker.observe("/about").await.unwrap();

        assert_eq!(transport.call_count(), 3);
    }
}
