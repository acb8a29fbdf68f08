//! Application Insights telemetry for captured orders.
//!
//! Events and traces are posted to the ingestion API as JSON envelopes.
//! Telemetry is best-effort: callers log failures and carry on.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;

use crate::config::{TelemetryConfig, TELEMETRY_TRACK_PATH};

const EVENT_ENVELOPE: &str = "Microsoft.ApplicationInsights.Event";
const MESSAGE_ENVELOPE: &str = "Microsoft.ApplicationInsights.Message";

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Telemetry request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Telemetry endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// A single ingestion envelope.
#[derive(Debug, Serialize)]
struct Envelope {
    name: &'static str,
    time: String,
    #[serde(rename = "iKey")]
    ikey: String,
    data: serde_json::Value,
}

/// Client for the Application Insights ingestion API.
#[derive(Clone, Debug)]
pub struct TelemetryClient {
    http: reqwest::Client,
    track_url: String,
    instrumentation_key: String,
}

impl TelemetryClient {
    /// Build a client, or `None` when no instrumentation key is configured.
    pub fn from_config(config: &TelemetryConfig, http: reqwest::Client) -> Option<Self> {
        let key = config.key()?;
        Some(Self {
            http,
            track_url: format!(
                "{}{}",
                config.endpoint.trim_end_matches('/'),
                TELEMETRY_TRACK_PATH
            ),
            instrumentation_key: key.trim().to_string(),
        })
    }

    /// Track a custom event.
    pub async fn track_event(&self, name: &str) -> Result<(), TelemetryError> {
        let data = json!({
            "baseType": "EventData",
            "baseData": { "ver": 2, "name": name },
        });
        self.send(self.envelope(EVENT_ENVELOPE, Utc::now(), data))
            .await
    }

    /// Track a trace message.
    pub async fn track_trace(&self, message: &str) -> Result<(), TelemetryError> {
        let data = json!({
            "baseType": "MessageData",
            "baseData": { "ver": 2, "message": message },
        });
        self.send(self.envelope(MESSAGE_ENVELOPE, Utc::now(), data))
            .await
    }

    fn envelope(&self, name: &'static str, time: DateTime<Utc>, data: serde_json::Value) -> Envelope {
        Envelope {
            name,
            time: time.to_rfc3339_opts(SecondsFormat::Millis, true),
            ikey: self.instrumentation_key.clone(),
            data,
        }
    }

    async fn send(&self, envelope: Envelope) -> Result<(), TelemetryError> {
        let response = self
            .http
            .post(&self.track_url)
            .json(&[envelope])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TelemetryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::trace!(url = %self.track_url, "Telemetry accepted");
        Ok(())
    }
}
