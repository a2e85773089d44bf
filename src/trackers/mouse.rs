//! Continuous pointer-stream adapter.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::debug;

use crate::event::{InteractionKind, Resolution, TrackerEvent};
use crate::shaping::Throttler;
use crate::surface::{InteractionSurface, ListenerGuard};
use crate::trackers::{shaper_now, AdapterContext};

/// One pointer observation, captured before shaping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseSample {
    pub x: f64,
    pub y: f64,
    pub resolution: Resolution,
    pub timestamp: i64,
}

/// Accumulates pointer samples and dispatches them in throttled batches.
///
/// Every sample lands in the accumulator immediately, stamped with the
/// viewport resolution and timestamp of its observation. Dispatch waits for
/// the throttle window to close (a `sleep_until` task armed from the
/// throttler's deadline), then the whole batch goes out as one multi-event
/// call and the accumulator resets. Reaching the flush threshold dispatches
/// at once instead of letting the batch grow for the rest of the window.
/// Dropping the tracker aborts any armed flush.
pub struct MouseTracker {
    inner: Arc<MouseInner>,
}

struct MouseInner {
    context: AdapterContext,
    flush_threshold: usize,
    state: Mutex<MouseState>,
}

struct MouseState {
    samples: Vec<MouseSample>,
    throttle: Throttler<u64>,
    flush_task: Option<JoinHandle<()>>,
}

impl MouseTracker {
    pub(crate) fn new(context: AdapterContext, window: Duration, flush_threshold: usize) -> Self {
        Self {
            inner: Arc::new(MouseInner {
                context,
                flush_threshold,
                state: Mutex::new(MouseState {
                    samples: Vec::new(),
                    throttle: Throttler::new(window, shaper_now()),
                    flush_task: None,
                }),
            }),
        }
    }

    /// Record one pointer position.
    pub fn record(&self, x: f64, y: f64) {
        self.inner.record(x, y);
    }

    /// Samples accumulated and not yet dispatched.
    pub fn pending_samples(&self) -> usize {
        self.inner
            .state
            .lock()
            .expect("mouse state poisoned")
            .samples
            .len()
    }

    /// Attach to a surface, recording every pointer movement it emits.
    ///
    /// Dropping the returned guard detaches from the surface it attached
    /// to. Signals without a position are ignored.
    pub fn mount(&self, surface: Arc<dyn InteractionSurface>) -> ListenerGuard {
        let weak = Arc::downgrade(&self.inner);
        let id = surface.add_listener(
            InteractionKind::MouseMove,
            Box::new(move |signal| {
                if let (Some(inner), Some((x, y))) = (weak.upgrade(), signal.position) {
                    inner.record(x, y);
                }
            }),
        );
        ListenerGuard::new(surface, InteractionKind::MouseMove, id)
    }
}

impl Drop for MouseTracker {
    fn drop(&mut self) {
        let task = self
            .inner
            .state
            .lock()
            .expect("mouse state poisoned")
            .flush_task
            .take();
        if let Some(task) = task {
            task.abort();
        }
    }
}

impl MouseInner {
    fn record(self: &Arc<Self>, x: f64, y: f64) {
        self.context.signal_activity();
        self.context.stats.record_mouse_sample();

        let resolution = *self.context.viewport.read().expect("viewport poisoned");
        let sample = MouseSample {
            x,
            y,
            resolution,
            timestamp: self.context.clock.now_millis(),
        };

        let now = shaper_now();
        let batch = {
            let mut state = self.state.lock().expect("mouse state poisoned");
            state.samples.push(sample);
            let watermark = state.samples.len() as u64;
            state.throttle.submit(watermark, now);

            if state.samples.len() >= self.flush_threshold {
                // Bound the accumulator: dispatch now rather than letting
                // the batch grow for the rest of the window.
                std::mem::take(&mut state.samples)
            } else {
                if state.flush_task.is_none() {
                    if let Some(deadline) = state.throttle.deadline() {
                        state.flush_task = Some(self.arm(deadline));
                    }
                }
                Vec::new()
            }
        };

        if !batch.is_empty() {
            self.dispatch(batch);
        }
    }

    /// Spawn the task that flushes once the throttle window closes.
    ///
    /// The throttler's deadline never moves while inputs keep arriving, so
    /// one armed task per window is enough. The task only holds a weak
    /// reference; a tracker dropped mid-window wins the race.
    fn arm(self: &Arc<Self>, deadline: Instant) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        self.context.handle.spawn(async move {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
            if let Some(inner) = weak.upgrade() {
                inner.flush(shaper_now());
            }
        })
    }

    /// Dispatch the accumulated batch if the throttle window has closed.
    fn flush(&self, now: Instant) {
        let batch = {
            let mut state = self.state.lock().expect("mouse state poisoned");
            state.flush_task = None;
            if state.throttle.poll(now).is_none() {
                return;
            }
            std::mem::take(&mut state.samples)
        };

        if !batch.is_empty() {
            self.dispatch(batch);
        }
    }

    fn dispatch(&self, batch: Vec<MouseSample>) {
        debug!(samples = batch.len(), "mouse batch dispatched");
        let events: Vec<TrackerEvent> = batch
            .into_iter()
            .map(|s| TrackerEvent::pointer(s.timestamp, s.x, s.y, s.resolution))
            .collect();
        self.context.dispatcher.send(events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::dispatch::EventDispatcher;
    use crate::session::SessionManager;
    use crate::stats::TrackerStats;
    use crate::storage::MemoryStorage;
    use crate::surface::{SurfaceHub, SurfaceSignal};
    use crate::testutil::{settle, RecordingTransport};
    use std::sync::RwLock;
    use tokio::runtime::Handle;

    const WINDOW: Duration = Duration::from_millis(2000);

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
            viewport: Arc::new(RwLock::new(Resolution::new(1920, 1080))),
            handle: Handle::current(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_dispatches_when_window_closes() {
        let transport = Arc::new(RecordingTransport::default());
        let tracker = MouseTracker::new(context(transport.clone()), WINDOW, 256);

        tracker.record(10.0, 20.0);
        tracker.record(11.0, 21.0);
        assert_eq!(tracker.pending_samples(), 2);
        assert_eq!(transport.call_count(), 0);

        tokio::time::sleep(Duration::from_millis(2100)).await;
        settle().await;

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        let (_, batch) = &calls[0];
        assert_eq!(batch.len(), 2);
        assert_eq!(tracker.pending_samples(), 0);

        let json = serde_json::to_value(&batch[0]).unwrap();
        assert_eq!(json["dimensions"]["event"], "mousemove");
        assert_eq!(json["dimensions"]["meta"]["x"], 10.0);
        assert_eq!(json["dimensions"]["meta"]["y"], 20.0);
        assert_eq!(json["dimensions"]["resolution"]["width"], 1920);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_dispatch_inside_window() {
        let transport = Arc::new(RecordingTransport::default());
        let tracker = MouseTracker::new(context(transport.clone()), WINDOW, 256);

        tracker.record(1.0, 1.0);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        settle().await;

        assert_eq!(transport.call_count(), 0);
        assert_eq!(tracker.pending_samples(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_threshold_flushes_without_waiting() {
        let transport = Arc::new(RecordingTransport::default());
        let tracker = MouseTracker::new(context(transport.clone()), WINDOW, 3);

        tracker.record(1.0, 1.0);
        tracker.record(2.0, 2.0);
        assert_eq!(transport.call_count(), 0);
        tracker.record(3.0, 3.0);
        settle().await;

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.len(), 3);
        assert_eq!(tracker.pending_samples(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_pending_flush() {
        let transport = Arc::new(RecordingTransport::default());
        let tracker = MouseTracker::new(context(transport.clone()), WINDOW, 256);

        tracker.record(5.0, 5.0);
        drop(tracker);

        tokio::time::sleep(Duration::from_millis(3000)).await;
        settle().await;
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_windows_anchor_to_previous_dispatch() {
        let transport = Arc::new(RecordingTransport::default());
        let tracker = MouseTracker::new(context(transport.clone()), WINDOW, 256);

        tracker.record(1.0, 1.0);
        tokio::time::sleep(Duration::from_millis(2100)).await;
        settle().await;
        assert_eq!(transport.call_count(), 1);

        // The next sample starts a fresh window from the last dispatch, so
        // it waits out the remainder rather than going immediately.
        tracker.record(2.0, 2.0);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        settle().await;
        assert_eq!(transport.call_count(), 1);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        settle().await;
        assert_eq!(transport.call_count(), 2);
        assert_eq!(transport.calls()[1].1.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mounted_tracker_consumes_pointer_signals() {
        let transport = Arc::new(RecordingTransport::default());
        let tracker = MouseTracker::new(context(transport.clone()), WINDOW, 256);
        let hub = Arc::new(SurfaceHub::new());
        let guard = tracker.mount(hub.clone());

        hub.emit(&SurfaceSignal::mouse_move(7.0, 8.0));
        hub.emit(&SurfaceSignal::click());
        assert_eq!(tracker.pending_samples(), 1);

        drop(guard);
        hub.emit(&SurfaceSignal::mouse_move(9.0, 9.0));
        assert_eq!(tracker.pending_samples(), 1);
    }
}
