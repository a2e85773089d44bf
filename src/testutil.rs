//! Shared test doubles.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::dispatch::StampedEvent;
use crate::transport::{Transport, TransportError};

/// Transport double recording every delivery it receives.
#[derive(Default)]
pub(crate) struct RecordingTransport {
    calls: Mutex<Vec<(String, Vec<StampedEvent>)>>,
    fail: bool,
}

impl RecordingTransport {
    /// A transport that records the delivery, then reports a network error.
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Every `(header, batch)` pair delivered so far, in order.
    pub(crate) fn calls(&self) -> Vec<(String, Vec<StampedEvent>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn deliver(
        &self,
        application_id: &str,
        events: &[StampedEvent],
    ) -> Result<(), TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((application_id.to_string(), events.to_vec()));
        if self.fail {
            return Err(TransportError::Network("connection refused".to_string()));
        }
        Ok(())
    }
}

/// Let tasks spawned on the current-thread test runtime run to completion.
pub(crate) async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
