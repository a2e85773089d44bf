//! Simulated host session.
//!
//! Drives a tracker through a short browsing session: register, navigate,
//! wiggle the pointer, click, and debounce a search box. Point it at any
//! HTTP sink on localhost:3000 to see the batches arrive; without one,
//! deliveries fail quietly at debug level, which is itself the point.
//!
//! ```sh
//! RUST_LOG=beacon_analytics=debug cargo run --example host_app
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use beacon_analytics::{
    Debouncer, Dimensions, MemoryStorage, RegisterOptions, SurfaceHub, SurfaceSignal, Tracker,
    TrackerConfig, TrackerEvent,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("beacon_analytics=debug")),
        )
        .init();

    // Picks up ~/.config/beacon-analytics/config.json when present.
    let config = TrackerConfig::load()?;
    println!("Dispatching to {}", config.endpoint);

    let tracker = Tracker::new(config, Arc::new(MemoryStorage::new()))?;
    tracker.register("demo-app", "storefront", RegisterOptions::default())?;
    tracker.resize(1920, 1080);

    // Wire the adapters to an in-process surface.
    let hub = Arc::new(SurfaceHub::new());
    let signup = tracker.click_tracker("signup-button");
    let mouse = tracker.mouse_tracker();
    let routes = tracker.route_tracker();
    let _click_guard = signup.mount(hub.clone());
    let _mouse_guard = mouse.mount(hub.clone());

    // Land, move the pointer around, click, navigate on.
    routes.observe("/");
    for i in 0..20 {
        hub.emit(&SurfaceSignal::mouse_move(40.0 * i as f64, 25.0 * i as f64));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    hub.emit(&SurfaceSignal::click());
    routes.observe("/pricing");

    // Debounce a search box and send one event for the settled query.
    let mut search: Debouncer<String> = Debouncer::new(Duration::from_millis(500));
    for text in ["p", "pr", "pri", "pricing"] {
        search.submit(text.to_string(), Instant::now());
        tokio::time::sleep(Duration::from_millis(120)).await;
    }
    tokio::time::sleep(Duration::from_millis(600)).await;
    if let Some(query) = search.poll(Instant::now()) {
        let mut meta = HashMap::new();
        meta.insert("query".to_string(), serde_json::json!(query));
        tracker.send(vec![TrackerEvent::with_dimensions(
            chrono::Utc::now().timestamp_millis(),
            Dimensions {
                tag: Some("search-box".to_string()),
                meta: Some(meta),
                ..Dimensions::default()
            },
        )]);
    }

    // Let the throttle window close so the mouse batch goes out.
    tokio::time::sleep(Duration::from_millis(2500)).await;

    println!("{}", tracker.stats_summary());
    Ok(())
}
