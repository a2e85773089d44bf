//! Counters describing what the tracker has observed and dispatched.
//!
//! Counts only: no payloads, coordinates, or identifiers are retained here,
//! so the numbers are safe to surface in a host UI or debug overlay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Live counters for the current tracker instance.
#[derive(Debug)]
pub struct TrackerStats {
    /// Clicks recorded by adapters
    clicks_recorded: AtomicU64,
    /// Mouse samples recorded by adapters
    mouse_samples_recorded: AtomicU64,
    /// Route changes recorded by adapters
    route_changes_recorded: AtomicU64,
    /// Batches handed to the transport
    batches_dispatched: AtomicU64,
    /// Individual events handed to the transport
    events_dispatched: AtomicU64,
    /// Sessions started because the idle window lapsed
    sessions_rotated: AtomicU64,
    /// Activity signals routed through the session manager
    activity_signals: AtomicU64,
    /// Tracker start time
    started_at: DateTime<Utc>,
}

impl TrackerStats {
    /// Create a fresh set of counters.
    pub fn new() -> Self {
        Self {
            clicks_recorded: AtomicU64::new(0),
            mouse_samples_recorded: AtomicU64::new(0),
            route_changes_recorded: AtomicU64::new(0),
            batches_dispatched: AtomicU64::new(0),
            events_dispatched: AtomicU64::new(0),
            sessions_rotated: AtomicU64::new(0),
            activity_signals: AtomicU64::new(0),
            started_at: Utc::now(),
        }
    }

    /// Record a click.
    pub fn record_click(&self) {
        self.clicks_recorded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a mouse sample.
    pub fn record_mouse_sample(&self) {
        self.mouse_samples_recorded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a route change.
    pub fn record_route_change(&self) {
        self.route_changes_recorded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a dispatched batch of `count` events.
    pub fn record_dispatch(&self, count: u64) {
        self.batches_dispatched.fetch_add(1, Ordering::Relaxed);
        self.events_dispatched.fetch_add(count, Ordering::Relaxed);
    }

    /// Record a session rotation.
    pub fn record_session_rotation(&self) {
        self.sessions_rotated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an activity signal.
    pub fn record_activity_signal(&self) {
        self.activity_signals.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            clicks_recorded: self.clicks_recorded.load(Ordering::Relaxed),
            mouse_samples_recorded: self.mouse_samples_recorded.load(Ordering::Relaxed),
            route_changes_recorded: self.route_changes_recorded.load(Ordering::Relaxed),
            batches_dispatched: self.batches_dispatched.load(Ordering::Relaxed),
            events_dispatched: self.events_dispatched.load(Ordering::Relaxed),
            sessions_rotated: self.sessions_rotated.load(Ordering::Relaxed),
            activity_signals: self.activity_signals.load(Ordering::Relaxed),
            started_at: self.started_at,
            uptime_secs: (Utc::now() - self.started_at).num_seconds() as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.snapshot();
        format!(
            "Tracker Statistics:\n\
             - Clicks recorded: {}\n\
             - Mouse samples recorded: {}\n\
             - Route changes recorded: {}\n\
             - Batches dispatched: {}\n\
             - Events dispatched: {}\n\
             - Sessions rotated: {}\n\
             - Activity signals: {}\n\
             - Uptime: {} seconds",
            stats.clicks_recorded,
            stats.mouse_samples_recorded,
            stats.route_changes_recorded,
            stats.batches_dispatched,
            stats.events_dispatched,
            stats.sessions_rotated,
            stats.activity_signals,
            stats.uptime_secs
        )
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.clicks_recorded.store(0, Ordering::Relaxed);
        self.mouse_samples_recorded.store(0, Ordering::Relaxed);
        self.route_changes_recorded.store(0, Ordering::Relaxed);
        self.batches_dispatched.store(0, Ordering::Relaxed);
        self.events_dispatched.store(0, Ordering::Relaxed);
        self.sessions_rotated.store(0, Ordering::Relaxed);
        self.activity_signals.store(0, Ordering::Relaxed);
    }
}

impl Default for TrackerStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of the counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub clicks_recorded: u64,
    pub mouse_samples_recorded: u64,
    pub route_changes_recorded: u64,
    pub batches_dispatched: u64,
    pub events_dispatched: u64,
    pub sessions_rotated: u64,
    pub activity_signals: u64,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: u64,
}

/// Thread-safe shared counters.
pub type SharedStats = Arc<TrackerStats>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_counting() {
        let stats = TrackerStats::new();

        stats.record_click();
        stats.record_click();
        stats.record_mouse_sample();
        stats.record_dispatch(3);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.clicks_recorded, 2);
        assert_eq!(snapshot.mouse_samples_recorded, 1);
        assert_eq!(snapshot.batches_dispatched, 1);
        assert_eq!(snapshot.events_dispatched, 3);
        assert_eq!(snapshot.route_changes_recorded, 0);
    }

    #[test]
    fn test_stats_reset() {
        let stats = TrackerStats::new();

        stats.record_route_change();
        stats.record_session_rotation();
        stats.record_activity_signal();
        stats.reset();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.route_changes_recorded, 0);
        assert_eq!(snapshot.sessions_rotated, 0);
        assert_eq!(snapshot.activity_signals, 0);
    }

    #[test]
    fn test_summary_format() {
        let stats = TrackerStats::new();
        stats.record_click();
        let summary = stats.summary();

        assert!(summary.contains("Clicks recorded: 1"));
        assert!(summary.contains("Batches dispatched"));
        assert!(summary.contains("Uptime"));
    }
}
