//! Event hub notifications for captured orders.
//!
//! Each notification is a single POST to the configured event URL, authorized
//! with a shared access token. There is no retry; a failure is reported once
//! to the caller.

use chrono::{DateTime, SecondsFormat, Utc};
use http::header::AUTHORIZATION;
use serde::Serialize;

use crate::config::{EventHubConfig, ORDER_STATUS_OPEN};
use crate::sas::{Clock, SignError, SystemClock, TokenSigner};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error(transparent)]
    Sign(#[from] SignError),

    #[error("Event hub request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Event hub returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Notification body sent to the event hub.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderEvent {
    pub order: String,
    pub source: String,
    pub time: String,
    pub status: String,
    pub hostname: String,
}

impl OrderEvent {
    pub fn open(order_id: &str, source: &str, hostname: &str, time: DateTime<Utc>) -> Self {
        Self {
            order: order_id.to_string(),
            source: source.to_string(),
            time: time.to_rfc3339_opts(SecondsFormat::Millis, true),
            status: ORDER_STATUS_OPEN.to_string(),
            hostname: hostname.to_string(),
        }
    }
}

/// Posts order events to an event hub endpoint.
#[derive(Clone, Debug)]
pub struct EventHubNotifier<C = SystemClock> {
    http: reqwest::Client,
    url: String,
    policy_name: String,
    policy_key: String,
    signer: TokenSigner<C>,
}

impl EventHubNotifier<SystemClock> {
    /// Build a notifier, or `None` when no event URL is configured.
    pub fn from_config(config: &EventHubConfig, http: reqwest::Client) -> Option<Self> {
        Self::with_signer(config, http, TokenSigner::new())
    }
}

impl<C: Clock> EventHubNotifier<C> {
    pub fn with_signer(
        config: &EventHubConfig,
        http: reqwest::Client,
        signer: TokenSigner<C>,
    ) -> Option<Self> {
        let url = config.url()?;
        Some(Self {
            http,
            url: url.trim().to_string(),
            policy_name: config.policy_name.trim().to_string(),
            policy_key: config.policy_key.trim().to_string(),
            signer,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Token for the `Authorization` header of the next request
    pub fn authorization(&self) -> Result<String, SignError> {
        self.signer
            .try_sign(&self.url, &self.policy_name, &self.policy_key)
            .map(|token| token.to_string())
    }

    /// Send one event.
    pub async fn notify(&self, event: &OrderEvent) -> Result<(), NotifyError> {
        let authorization = self.authorization()?;

        let response = self
            .http
            .post(&self.url)
            .header(AUTHORIZATION, authorization)
            .json(event)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(order = %event.order, status = status.as_u16(), "Order event delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sas::FixedClock;

    fn config(url: &str, name: &str, key: &str) -> EventHubConfig {
        EventHubConfig {
            url: Some(url.to_string()),
            policy_name: name.to_string(),
            policy_key: key.to_string(),
        }
    }

    #[test]
    fn test_disabled_without_url() {
        let config = EventHubConfig::default();
        assert!(EventHubNotifier::from_config(&config, reqwest::Client::new()).is_none());
    }

    #[test]
    fn test_authorization_uses_trimmed_settings() {
        let notifier = EventHubNotifier::with_signer(
            &config(
                " https://example.servicebus.windows.net/hub \n",
                " mypolicy",
                "secretkey ",
            ),
            reqwest::Client::new(),
            TokenSigner::with_clock(FixedClock(1_000_000_000)),
        )
        .unwrap();

        assert_eq!(notifier.url(), "https://example.servicebus.windows.net/hub");
        assert_eq!(
            notifier.authorization().unwrap(),
            "SharedAccessSignature sr=https%3A%2F%2Fexample.servicebus.windows.net%2Fhub&sig=QGZbmBVl3nrCswn8yF55FAXxSQQ4Txyf7W1YSqcgMIg%3D&se=1000604800&skn=mypolicy"
        );
    }

    #[test]
    fn test_missing_policy_key_is_reported() {
        let notifier = EventHubNotifier::from_config(
            &config("https://example.servicebus.windows.net/hub", "mypolicy", "  "),
            reqwest::Client::new(),
        )
        .unwrap();
        assert_eq!(notifier.authorization(), Err(SignError::MissingParameter));
    }

    #[test]
    fn test_order_event_json() {
        let time = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let event = OrderEvent::open("abc", "aks", "pod-1", time);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "order": "abc",
                "source": "aks",
                "time": "2024-05-01T12:00:00.000Z",
                "status": "Open",
                "hostname": "pod-1",
            })
        );
    }
}
