//! Telemetry emission
//!
//! Events are queued on a bounded channel and drained by a background task,
//! which logs each one and forwards it to an HTTP collector when one is
//! configured. Callers never wait on delivery; a full queue drops the event
//! with a warning.

use chrono::{DateTime, Utc};
use court_hearing_core::{TelemetryEmitter, TelemetryEventType, TelemetryProperties};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{error, info, warn};

use crate::config::TelemetryConfig;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Collector returned status {0}")]
    Status(u16),
}

/// One telemetry event as sent to the collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRecord {
    pub event_type: TelemetryEventType,
    pub properties: TelemetryProperties,
    pub timestamp: DateTime<Utc>,
}

/// [`TelemetryEmitter`] backed by a background task
pub struct ChannelTelemetry {
    sender: mpsc::Sender<TelemetryRecord>,
}

impl ChannelTelemetry {
    /// Create the emitter and spawn its background task. Must be called
    /// inside a tokio runtime.
    pub fn spawn(config: &TelemetryConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_size.max(1));
        let forwarder = config.endpoint.as_ref().map(|endpoint| {
            CollectorClient::new(
                endpoint.clone(),
                config.api_key.clone(),
                Duration::from_millis(config.timeout_ms),
            )
        });

        tokio::spawn(Self::background_emitter(receiver, forwarder));

        Self { sender }
    }

    async fn background_emitter(
        mut receiver: mpsc::Receiver<TelemetryRecord>,
        forwarder: Option<CollectorClient>,
    ) {
        while let Some(record) = receiver.recv().await {
            info!(
                event_type = %record.event_type,
                properties = ?record.properties,
                "Telemetry event"
            );

            if let Some(client) = &forwarder {
                if let Err(e) = client.send(&record).await {
                    warn!(
                        event_type = %record.event_type,
                        error = %e,
                        "Failed to forward telemetry event"
                    );
                }
            }
        }
    }
}

impl TelemetryEmitter for ChannelTelemetry {
    fn track_event(&self, event_type: TelemetryEventType, properties: TelemetryProperties) {
        let record = TelemetryRecord {
            event_type,
            properties,
            timestamp: Utc::now(),
        };

        match self.sender.try_send(record) {
            Ok(()) => {}
            Err(TrySendError::Full(record)) => {
                warn!(event_type = %record.event_type, "Telemetry queue full, event dropped");
            }
            Err(TrySendError::Closed(record)) => {
                error!(event_type = %record.event_type, "Telemetry task stopped, event dropped");
            }
        }
    }
}

/// HTTP client for the telemetry collector
pub struct CollectorClient {
    url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl CollectorClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        let base_url = base_url.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default telemetry HTTP client");
                reqwest::Client::new()
            });

        Self {
            url: format!("{}/events", base_url.trim_end_matches('/')),
            api_key,
            client,
        }
    }

    pub async fn send(&self, record: &TelemetryRecord) -> Result<(), TelemetryError> {
        let mut request = self.client.post(&self.url).json(record);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(TelemetryError::Status(response.status().as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn properties() -> TelemetryProperties {
        TelemetryProperties::from([
            ("courtCode".to_string(), Some("B10JQ".to_string())),
            ("caseId".to_string(), None),
        ])
    }

    async fn wait_for_requests(server: &MockServer, count: usize) -> Vec<wiremock::Request> {
        for _ in 0..50 {
            let received = server.received_requests().await.unwrap_or_default();
            if received.len() >= count {
                return received;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        server.received_requests().await.unwrap_or_default()
    }

    #[tokio::test]
    async fn test_events_forwarded_to_collector() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/events"))
            .and(header("authorization", "Bearer key"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let telemetry = ChannelTelemetry::spawn(&TelemetryConfig {
            endpoint: Some(server.uri()),
            api_key: Some("key".to_string()),
            ..Default::default()
        });
        telemetry.track_event(TelemetryEventType::CourtHearingUpdateEventReceived, properties());

        let received = wait_for_requests(&server, 1).await;
        assert_eq!(received.len(), 1);

        let record: TelemetryRecord = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(record.event_type, TelemetryEventType::CourtHearingUpdateEventReceived);
        assert_eq!(record.properties, properties());
    }

    #[tokio::test]
    async fn test_collector_failure_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let telemetry = ChannelTelemetry::spawn(&TelemetryConfig {
            endpoint: Some(server.uri()),
            ..Default::default()
        });
        telemetry.track_event(TelemetryEventType::CourtHearingDeleteEventReceived, properties());
        telemetry.track_event(TelemetryEventType::CourtHearingDeleteEventReceived, properties());

        assert_eq!(wait_for_requests(&server, 2).await.len(), 2);
    }

    #[tokio::test]
    async fn test_collector_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = CollectorClient::new(server.uri(), None, Duration::from_secs(1));
        let record = TelemetryRecord {
            event_type: TelemetryEventType::CourtHearingResultEventReceived,
            properties: properties(),
            timestamp: Utc::now(),
        };

        assert!(matches!(client.send(&record).await, Err(TelemetryError::Status(503))));
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/events"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let telemetry = ChannelTelemetry::spawn(&TelemetryConfig {
            endpoint: Some(server.uri()),
            queue_size: 1,
            ..Default::default()
        });

        // The test runtime is single threaded, so the emitter task cannot
        // drain the queue until this loop yields.
        for _ in 0..10 {
            telemetry.track_event(TelemetryEventType::CourtHearingUpdateEventReceived, properties());
        }

        assert_eq!(wait_for_requests(&server, 1).await.len(), 1);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(server.received_requests().await.unwrap_or_default().len(), 1);
    }
}
