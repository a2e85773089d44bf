//! The tracker context a host embeds.
//!
//! One [`Tracker`] owns the session manager, dispatcher, viewport snapshot,
//! and stats, and hands out instrumentation adapters wired to them. It is an
//! explicit value rather than a process-wide singleton: a host can run two
//! trackers against two endpoints without them sharing anything but the
//! storage it gives them.

use std::sync::{Arc, RwLock};

use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::config::TrackerConfig;
use crate::dispatch::EventDispatcher;
use crate::event::{InteractionKind, Resolution, TrackerEvent};
use crate::session::{RegisterOptions, SessionError, SessionManager};
use crate::stats::{SharedStats, StatsSnapshot, TrackerStats};
use crate::storage::Storage;
use crate::trackers::{AdapterContext, AdapterError, ClickTracker, MouseTracker, RouteTracker};
use crate::transport::{HttpTransport, Transport};

/// Where spawned work runs.
///
/// Inside a host runtime we borrow its handle; otherwise the tracker owns a
/// single-worker runtime so delivery still happens in the background. The
/// owned runtime only ever exists for trackers built on sync threads, which
/// is also where such a tracker gets dropped.
enum RuntimeContext {
    Ambient(Handle),
    Owned(Runtime),
}

impl RuntimeContext {
    fn acquire() -> Result<Self, TrackerError> {
        match Handle::try_current() {
            Ok(handle) => Ok(RuntimeContext::Ambient(handle)),
            Err(_) => {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(1)
                    .enable_all()
                    .build()
                    .map_err(|e| TrackerError::Runtime(format!("Failed to create runtime: {e}")))?;
                Ok(RuntimeContext::Owned(runtime))
            }
        }
    }

    fn handle(&self) -> Handle {
        match self {
            RuntimeContext::Ambient(handle) => handle.clone(),
            RuntimeContext::Owned(runtime) => runtime.handle().clone(),
        }
    }
}

/// Tracker errors.
#[derive(Debug)]
pub enum TrackerError {
    /// Async runtime could not be created
    Runtime(String),
}

impl std::fmt::Display for TrackerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackerError::Runtime(e) => write!(f, "Runtime error: {e}"),
        }
    }
}

impl std::error::Error for TrackerError {}

/// Host-embedded analytics tracker.
pub struct Tracker {
    config: TrackerConfig,
    session: Arc<SessionManager>,
    dispatcher: Arc<EventDispatcher>,
    stats: SharedStats,
    clock: Arc<dyn Clock>,
    viewport: Arc<RwLock<Resolution>>,
    runtime: RuntimeContext,
}

impl Tracker {
    /// Create a tracker delivering to the configured HTTP endpoint.
    pub fn new(config: TrackerConfig, storage: Arc<dyn Storage>) -> Result<Self, TrackerError> {
        let transport = Arc::new(HttpTransport::new(
            config.endpoint.clone(),
            config.request_timeout(),
        ));
        Self::with_transport(config, storage, transport)
    }

    /// Create a tracker delivering through the given transport.
    pub fn with_transport(
        config: TrackerConfig,
        storage: Arc<dyn Storage>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, TrackerError> {
        Self::with_parts(config, storage, transport, Arc::new(SystemClock))
    }

    /// Create a tracker with every collaborator supplied by the caller.
    pub fn with_parts(
        config: TrackerConfig,
        storage: Arc<dyn Storage>,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TrackerError> {
        let runtime = RuntimeContext::acquire()?;
        let session = Arc::new(SessionManager::new(storage, clock.clone()));
        let stats = Arc::new(TrackerStats::new());
        let dispatcher = Arc::new(EventDispatcher::new(
            session.clone(),
            transport,
            stats.clone(),
            runtime.handle(),
        ));

        Ok(Self {
            config,
            session,
            dispatcher,
            stats,
            clock,
            viewport: Arc::new(RwLock::new(Resolution::default())),
            runtime,
        })
    }

    /// Bind the tracker to an application and label service.
    ///
    /// Fails on an empty application id or label service. Resolves the
    /// durable visitor id and starts (or adopts) a session, so events
    /// dispatched afterwards carry a full identity.
    pub fn register(
        &self,
        application_id: &str,
        label_service: &str,
        options: RegisterOptions,
    ) -> Result<(), SessionError> {
        let rotated = self.session.register(application_id, label_service, options)?;
        self.stats.record_activity_signal();
        if rotated {
            self.stats.record_session_rotation();
        }
        info!(application_id, label_service, "tracker registered");
        Ok(())
    }

    /// Mark the user as active, extending the current session or rotating
    /// to a fresh one when the idle window has lapsed. Returns whether a
    /// rotation happened.
    pub fn record_activity(&self) -> bool {
        self.stats.record_activity_signal();
        let rotated = self.session.record_activity();
        if rotated {
            self.stats.record_session_rotation();
        }
        rotated
    }

    /// Stamp a batch with the current identity and deliver it in the
    /// background. See [`EventDispatcher::send`].
    pub fn send(&self, events: Vec<TrackerEvent>) -> JoinHandle<()> {
        self.dispatcher.send(events)
    }

    /// The registered application id.
    pub fn application_id(&self) -> Result<String, SessionError> {
        self.session.application_id()
    }

    /// The current session id, if a session has been started.
    pub fn session_id(&self) -> Option<String> {
        self.session.session_id()
    }

    /// The durable visitor id, once registration has resolved it.
    pub fn visitor_id(&self) -> Option<String> {
        self.session.visitor_id()
    }

    /// Update the viewport snapshot from the host's resize signal.
    pub fn resize(&self, width: u32, height: u32) {
        *self.viewport.write().expect("viewport poisoned") = Resolution::new(width, height);
    }

    /// The current viewport snapshot.
    pub fn resolution(&self) -> Resolution {
        *self.viewport.read().expect("viewport poisoned")
    }

    /// Adapter recording discrete clicks on a tagged element.
    pub fn click_tracker(&self, tag: impl Into<String>) -> ClickTracker {
        ClickTracker::build(self.adapter_context(), InteractionKind::Click, tag.into())
    }

    /// Adapter for an explicit interaction kind.
    ///
    /// Kinds that need a dedicated adapter (the continuous pointer stream)
    /// are rejected rather than instrumented badly.
    pub fn interaction_tracker(
        &self,
        kind: InteractionKind,
        tag: impl Into<String>,
    ) -> Result<ClickTracker, AdapterError> {
        ClickTracker::new(self.adapter_context(), kind, tag.into())
    }

    /// Adapter batching the continuous pointer stream.
    pub fn mouse_tracker(&self) -> MouseTracker {
        MouseTracker::new(
            self.adapter_context(),
            self.config.throttle_window(),
            self.config.flush_threshold,
        )
    }

    /// Adapter recording navigation signals.
    pub fn route_tracker(&self) -> RouteTracker {
        RouteTracker::new(self.adapter_context())
    }

    /// Point-in-time view of the tracker's counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Human-readable counter summary.
    pub fn stats_summary(&self) -> String {
        self.stats.summary()
    }

    /// The configuration this tracker was built with.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    fn adapter_context(&self) -> AdapterContext {
        AdapterContext {
            session: self.session.clone(),
            dispatcher: self.dispatcher.clone(),
            stats: self.stats.clone(),
            clock: self.clock.clone(),
            viewport: self.viewport.clone(),
            handle: self.runtime.handle(),
        }
    }
}
