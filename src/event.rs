//! Event types shared across the tracker.
//!
//! A [`TrackerEvent`] is constructed by an adapter at the moment of
//! observation and enriched with identity fields at dispatch time. Unset
//! dimensions are omitted from the JSON body, matching the collection
//! endpoint's wire format.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Viewport size snapshot, read when pointer samples are constructed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// The closed set of interaction kinds the adapters can instrument.
///
/// Extending instrumentation means adding a variant here; an adapter asked
/// to observe a kind it does not support reports an explicit error rather
/// than silently doing nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Click,
    MouseMove,
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionKind::Click => write!(f, "click"),
            InteractionKind::MouseMove => write!(f, "mousemove"),
        }
    }
}

/// Named attributes attached to a tracked event.
///
/// All fields are optional; unknown keys pass through untouched via `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dimensions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<InteractionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, serde_json::Value>>,
    /// Free-form extension dimensions, flattened into the same JSON object.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// A single tracked interaction, timestamped in epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerEvent {
    /// When the triggering signal was observed (epoch millis).
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
}

impl TrackerEvent {
    /// Create a bare event with no dimensions.
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            dimensions: None,
        }
    }

    /// Create an event with the given dimensions.
    pub fn with_dimensions(timestamp: i64, dimensions: Dimensions) -> Self {
        Self {
            timestamp,
            dimensions: Some(dimensions),
        }
    }

    /// Create a tagged interaction event (the click tracker's shape).
    pub fn interaction(timestamp: i64, kind: InteractionKind, tag: impl Into<String>) -> Self {
        Self::with_dimensions(
            timestamp,
            Dimensions {
                event: Some(kind),
                tag: Some(tag.into()),
                ..Dimensions::default()
            },
        )
    }

    /// Create a navigation event carrying the current logical path.
    pub fn navigation(timestamp: i64, route: impl Into<String>) -> Self {
        Self::with_dimensions(
            timestamp,
            Dimensions {
                route: Some(route.into()),
                ..Dimensions::default()
            },
        )
    }

    /// Create a pointer movement event with its position in `meta`.
    pub fn pointer(timestamp: i64, x: f64, y: f64, resolution: Resolution) -> Self {
        let mut meta = HashMap::new();
        meta.insert("x".to_string(), serde_json::json!(x));
        meta.insert("y".to_string(), serde_json::json!(y));

        Self::with_dimensions(
            timestamp,
            Dimensions {
                event: Some(InteractionKind::MouseMove),
                meta: Some(meta),
                resolution: Some(resolution),
                ..Dimensions::default()
            },
        )
    }
}
