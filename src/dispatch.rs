//! Identity stamping and fire-and-forget delivery.
//!
//! The dispatcher is the single path from adapters to the wire. Each `send`
//! snapshots the identity once, stamps it onto every event in the batch, and
//! spawns exactly one transport call. Delivery is best effort: the host is
//! never blocked on it and never sees its failures.

use std::sync::Arc;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::event::TrackerEvent;
use crate::session::{Identity, SessionManager};
use crate::stats::TrackerStats;
use crate::transport::Transport;

/// A tracker event enriched with the identity fields the collection backend
/// groups by. Unset fields disappear from the JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StampedEvent {
    #[serde(flatten)]
    pub event: TrackerEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visitor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_service: Option<String>,
}

impl StampedEvent {
    /// Stamp one event with an identity snapshot.
    pub fn stamp(event: TrackerEvent, identity: &Identity) -> Self {
        Self {
            event,
            application_id: identity.application_id.clone(),
            session_id: identity.session_id.clone(),
            visitor_id: identity.visitor_id.clone(),
            label_service: identity.label_service.clone(),
        }
    }
}

/// Stamps batches and hands them to the transport on a spawned task.
pub struct EventDispatcher {
    session: Arc<SessionManager>,
    transport: Arc<dyn Transport>,
    stats: Arc<TrackerStats>,
    handle: Handle,
}

impl EventDispatcher {
    pub fn new(
        session: Arc<SessionManager>,
        transport: Arc<dyn Transport>,
        stats: Arc<TrackerStats>,
        handle: Handle,
    ) -> Self {
        Self {
            session,
            transport,
            stats,
            handle,
        }
    }

    /// Stamp a batch with the current identity and deliver it without
    /// blocking the caller.
    ///
    /// One invocation means one transport call, however many events the
    /// batch holds. Identity fields absent before registration are simply
    /// left off the records, and the header falls back to the empty string.
    /// Failures are logged at `debug` and swallowed; the returned handle
    /// exists so tests can await the delivery, callers otherwise drop it.
    pub fn send(&self, events: Vec<TrackerEvent>) -> JoinHandle<()> {
        let identity = self.session.identity();
        let application_id = identity.application_id.clone().unwrap_or_default();
        let batch: Vec<StampedEvent> = events
            .into_iter()
            .map(|event| StampedEvent::stamp(event, &identity))
            .collect();

        self.stats.record_dispatch(batch.len() as u64);

        let transport = Arc::clone(&self.transport);
        self.handle.spawn(async move {
            if let Err(e) = transport.deliver(&application_id, &batch).await {
                debug!(error = %e, count = batch.len(), "event delivery failed");
            }
        })
    }
}
