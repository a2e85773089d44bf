//! Host-side interaction surfaces that adapters mount on.
//!
//! A host exposes its signal source (a window, a widget tree, a replayed
//! trace) as an [`InteractionSurface`]; adapters attach listeners to it and
//! get a [`ListenerGuard`] whose drop is the detach. [`SurfaceHub`] is the
//! bundled in-process implementation for hosts without their own.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::event::InteractionKind;

/// A signal observed on a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSignal {
    pub kind: InteractionKind,
    /// Pointer position, present for mouse signals.
    pub position: Option<(f64, f64)>,
}

impl SurfaceSignal {
    /// A click signal.
    pub fn click() -> Self {
        Self {
            kind: InteractionKind::Click,
            position: None,
        }
    }

    /// A pointer movement signal at the given position.
    pub fn mouse_move(x: f64, y: f64) -> Self {
        Self {
            kind: InteractionKind::MouseMove,
            position: Some((x, y)),
        }
    }
}

/// Identifier of an attached listener.
pub type ListenerId = u64;

/// Callback invoked for each signal of the subscribed kind.
pub type SignalListener = Box<dyn Fn(&SurfaceSignal) + Send + Sync>;

/// Anything that can feed interaction signals to attached listeners.
pub trait InteractionSurface: Send + Sync {
    /// Attach a listener for one signal kind, returning its id.
    fn add_listener(&self, kind: InteractionKind, listener: SignalListener) -> ListenerId;

    /// Detach a previously attached listener. Unknown ids are ignored.
    fn remove_listener(&self, kind: InteractionKind, id: ListenerId);
}

/// Detaches its listener when dropped.
///
/// The guard owns the surface reference captured at attach time, so the
/// detach always lands on the surface the listener was actually attached
/// to, no matter what the owner has mounted since.
#[must_use = "dropping the guard detaches the listener immediately"]
pub struct ListenerGuard {
    surface: Arc<dyn InteractionSurface>,
    kind: InteractionKind,
    id: ListenerId,
}

impl ListenerGuard {
    pub fn new(surface: Arc<dyn InteractionSurface>, kind: InteractionKind, id: ListenerId) -> Self {
        Self { surface, kind, id }
    }

    /// The id of the guarded listener.
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.surface.remove_listener(self.kind, self.id);
    }
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish()
    }
}

/// In-process surface hosts can emit signals into.
pub struct SurfaceHub {
    listeners: Mutex<HashMap<InteractionKind, Vec<(ListenerId, Arc<dyn Fn(&SurfaceSignal) + Send + Sync>)>>>,
    next_id: AtomicU64,
}

impl SurfaceHub {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Deliver a signal to every listener subscribed to its kind.
    ///
    /// Listeners run outside the registry lock, so a listener may attach or
    /// detach (including itself) from within its own invocation.
    pub fn emit(&self, signal: &SurfaceSignal) {
        let subscribed: Vec<_> = {
            let listeners = self.listeners.lock().expect("listener registry poisoned");
            listeners
                .get(&signal.kind)
                .map(|entries| entries.iter().map(|(_, l)| Arc::clone(l)).collect())
                .unwrap_or_default()
        };

        for listener in subscribed {
            listener(signal);
        }
    }

    /// Number of listeners currently attached for a kind.
    pub fn listener_count(&self, kind: InteractionKind) -> usize {
        self.listeners
            .lock()
            .expect("listener registry poisoned")
            .get(&kind)
            .map_or(0, Vec::len)
    }
}

impl Default for SurfaceHub {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionSurface for SurfaceHub {
    fn add_listener(&self, kind: InteractionKind, listener: SignalListener) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .expect("listener registry poisoned")
            .entry(kind)
            .or_default()
            .push((id, Arc::from(listener)));
        id
    }

    fn remove_listener(&self, kind: InteractionKind, id: ListenerId) {
        let mut listeners = self.listeners.lock().expect("listener registry poisoned");
        if let Some(subscribed) = listeners.get_mut(&kind) {
            subscribed.retain(|(attached, _)| *attached != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_emit_reaches_only_subscribed_kind() {
        let hub = SurfaceHub::new();
        let clicks = Arc::new(AtomicUsize::new(0));

        let seen = clicks.clone();
        hub.add_listener(
            InteractionKind::Click,
            Box::new(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );

        hub.emit(&SurfaceSignal::click());
        hub.emit(&SurfaceSignal::mouse_move(3.0, 4.0));
        hub.emit(&SurfaceSignal::click());

        assert_eq!(clicks.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_guard_detaches_on_drop() {
        let hub: Arc<SurfaceHub> = Arc::new(SurfaceHub::new());
        let seen = Arc::new(AtomicUsize::new(0));

        let counter = seen.clone();
        let id = hub.add_listener(
            InteractionKind::Click,
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let guard = ListenerGuard::new(hub.clone(), InteractionKind::Click, id);
        assert_eq!(hub.listener_count(InteractionKind::Click), 1);

        hub.emit(&SurfaceSignal::click());
        drop(guard);

        assert_eq!(hub.listener_count(InteractionKind::Click), 0);
        hub.emit(&SurfaceSignal::click());
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_unknown_listener_is_ignored() {
        let hub = SurfaceHub::new();
        hub.remove_listener(InteractionKind::MouseMove, 99);
        assert_eq!(hub.listener_count(InteractionKind::MouseMove), 0);
    }

    #[test]
    fn test_listener_may_detach_during_emit() {
        let hub = Arc::new(SurfaceHub::new());

        let inner = hub.clone();
        let id = Arc::new(AtomicU64::new(0));
        let own_id = id.clone();
        let assigned = hub.add_listener(
            InteractionKind::Click,
            Box::new(move |_| {
                inner.remove_listener(InteractionKind::Click, own_id.load(Ordering::SeqCst));
            }),
        );
        id.store(assigned, Ordering::SeqCst);

        hub.emit(&SurfaceSignal::click());
        assert_eq!(hub.listener_count(InteractionKind::Click), 0);
    }
}
