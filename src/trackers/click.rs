//! Discrete interaction adapter.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::event::{InteractionKind, TrackerEvent};
use crate::surface::{InteractionSurface, ListenerGuard};
use crate::trackers::{AdapterContext, AdapterError};

/// Records one event per discrete interaction on a tagged element.
///
/// Only discrete kinds belong here; the continuous pointer stream goes
/// through [`MouseTracker`](crate::trackers::MouseTracker) so it gets rate
/// shaped. Asking for a kind this adapter cannot instrument is an explicit
/// construction error.
#[derive(Clone)]
pub struct ClickTracker {
    context: AdapterContext,
    kind: InteractionKind,
    tag: String,
}

impl ClickTracker {
    pub(crate) fn new(
        context: AdapterContext,
        kind: InteractionKind,
        tag: String,
    ) -> Result<Self, AdapterError> {
        if kind != InteractionKind::Click {
            return Err(AdapterError::Unsupported(kind));
        }
        Ok(Self::build(context, kind, tag))
    }

    pub(crate) fn build(context: AdapterContext, kind: InteractionKind, tag: String) -> Self {
        Self { context, kind, tag }
    }

    /// The tag stamped onto this adapter's events.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Record one interaction.
    ///
    /// Signals activity, then dispatches a single event carrying the kind
    /// and tag. The returned handle tracks the spawned delivery; dropping it
    /// is the normal case.
    pub fn record(&self) -> JoinHandle<()> {
        self.context.signal_activity();
        self.context.stats.record_click();
        debug!(tag = %self.tag, kind = %self.kind, "interaction recorded");

        let event = TrackerEvent::interaction(
            self.context.clock.now_millis(),
            self.kind,
            self.tag.clone(),
        );
        self.context.dispatcher.send(vec![event])
    }

    /// Attach to a surface, recording on every signal of this adapter's
    /// kind.
    ///
    /// Dropping the returned guard detaches from the surface it attached
    /// to; mounting on a replacement surface is simply another `mount`.
    pub fn mount(&self, surface: Arc<dyn InteractionSurface>) -> ListenerGuard {
        let tracker = self.clone();
        let id = surface.add_listener(
            self.kind,
            Box::new(move |_signal| {
                tracker.record();
            }),
        );
        ListenerGuard::new(surface, self.kind, id)
    }
}

impl std::fmt::Debug for ClickTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickTracker")
            .field("kind", &self.kind)
            .field("tag", &self.tag)
            .finish()
    }
}
