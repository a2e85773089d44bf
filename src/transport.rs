//! Transport for delivering stamped event batches to a collection endpoint.
//!
//! The [`Transport`] trait is the seam between the dispatcher and the wire;
//! [`HttpTransport`] is the production implementation, and tests swap in a
//! recording double.

use async_trait::async_trait;
use std::time::Duration;

use crate::dispatch::StampedEvent;

/// Header carrying the application id on every delivery.
pub const APPLICATION_ID_HEADER: &str = "x-application-id";

/// Delivery of one stamped batch to wherever events are collected.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver one batch. `application_id` may be empty before registration.
    async fn deliver(
        &self,
        application_id: &str,
        events: &[StampedEvent],
    ) -> Result<(), TransportError>;
}

/// Transport error types.
#[derive(Debug)]
pub enum TransportError {
    /// Network/HTTP error
    Network(String),
    /// Server returned an error response
    Server { status: u16, message: String },
    /// JSON serialization error
    Serialization(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Network(msg) => write!(f, "Transport network error: {msg}"),
            TransportError::Server { status, message } => {
                write!(f, "Transport server error ({status}): {message}")
            }
            TransportError::Serialization(msg) => {
                write!(f, "Transport serialization error: {msg}")
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// HTTP transport posting batches to `{endpoint}/tracker-event`.
pub struct HttpTransport {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport against the given endpoint base URL.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the event collection endpoint URL.
    pub fn events_url(&self) -> String {
        format!("{}/tracker-event", self.endpoint)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn deliver(
        &self,
        application_id: &str,
        events: &[StampedEvent],
    ) -> Result<(), TransportError> {
        let body = serde_json::to_vec(events)
            .map_err(|e| TransportError::Serialization(e.to_string()))?;

        let response = self
            .client
            .post(self.events_url())
            .header(APPLICATION_ID_HEADER, application_id)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransportError::Server {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
