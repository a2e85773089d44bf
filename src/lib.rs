//! Beacon Analytics - best-effort user behavior tracking for embedded hosts.
//!
//! This library turns host interaction signals (clicks, pointer movement,
//! navigation) into identity-stamped events and delivers them to a
//! collection endpoint in the background. Telemetry is strictly best
//! effort: nothing here ever blocks the host on the network or surfaces a
//! delivery failure to it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Beacon Analytics                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │  Adapters   │──▶│   Shaping   │──▶│  Dispatch   │       │
//! │  │(click/mouse/│   │ (throttle/  │   │ (stamp +    │       │
//! │  │   route)    │   │  debounce)  │   │  spawn)     │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │         │                                    │              │
//! │         ▼                                    ▼              │
//! │  ┌─────────────┐                     ┌─────────────┐       │
//! │  │   Session   │                     │  Transport  │       │
//! │  │ (identity)  │                     │   (HTTP)    │       │
//! │  └─────────────┘                     └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use beacon_analytics::{MemoryStorage, RegisterOptions, Tracker, TrackerConfig};
//! use std::sync::Arc;
//!
//! let tracker = Tracker::new(TrackerConfig::default(), Arc::new(MemoryStorage::new()))
//!     .expect("Failed to create tracker");
//! tracker
//!     .register("my-app", "checkout", RegisterOptions::default())
//!     .expect("Failed to register");
//!
//! // Instrument a button and a router
//! let signup = tracker.click_tracker("signup-button");
//! signup.record();
//!
//! let routes = tracker.route_tracker();
//! routes.observe("/pricing");
//! ```

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod event;
pub mod session;
pub mod shaping;
pub mod stats;
pub mod storage;
pub mod surface;
pub mod tracker;
pub mod trackers;
pub mod transport;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export key types at crate root for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, TrackerConfig};
pub use dispatch::{EventDispatcher, StampedEvent};
pub use event::{Dimensions, InteractionKind, Resolution, TrackerEvent};
pub use session::{Identity, RegisterOptions, SessionError, SessionManager};
pub use shaping::{Debouncer, HasLen, Throttler};
pub use stats::{SharedStats, StatsSnapshot, TrackerStats};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use surface::{InteractionSurface, ListenerGuard, SurfaceHub, SurfaceSignal};
pub use tracker::{Tracker, TrackerError};
pub use trackers::{AdapterError, ClickTracker, MouseSample, MouseTracker, RouteTracker};
pub use transport::{HttpTransport, Transport, TransportError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
