//! Order submission workflow.
//!
//! Capturing an order stores it, then emits telemetry and an event hub
//! notification when those are configured. Only the store write can fail a
//! capture; telemetry and notification failures are logged and dropped.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::Order;
use crate::notify::{EventHubNotifier, OrderEvent};
use crate::store::OrderStore;
use crate::telemetry::TelemetryClient;

/// Captures orders. Cheap to clone; all collaborators are shared.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    telemetry: Option<TelemetryClient>,
    notifier: Option<EventHubNotifier>,
    default_source: Arc<str>,
    hostname: Arc<str>,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        telemetry: Option<TelemetryClient>,
        notifier: Option<EventHubNotifier>,
        default_source: &str,
        hostname: &str,
    ) -> Self {
        Self {
            store,
            telemetry,
            notifier,
            default_source: Arc::from(default_source),
            hostname: Arc::from(hostname),
        }
    }

    /// Wire the service from configuration, sharing one HTTP client between
    /// telemetry and notifications.
    pub fn from_config(config: &AppConfig, store: Arc<dyn OrderStore>, http: reqwest::Client) -> Self {
        let telemetry = TelemetryClient::from_config(&config.telemetry, http.clone());
        let notifier = EventHubNotifier::from_config(&config.event_hub, http);

        tracing::info!(
            store = store.backend(),
            telemetry = telemetry.is_some(),
            event_hub = notifier.is_some(),
            "Order service configured"
        );

        Self::new(
            store,
            telemetry,
            notifier,
            &config.order.source,
            &config.instance.hostname,
        )
    }

    /// Store a new order and return its id.
    #[instrument(name = "orders::capture", skip_all)]
    pub async fn capture(&self, order: Order) -> Result<String, AppError> {
        if order.email_address.trim().is_empty() {
            return Err(AppError::Validation("EmailAddress is required".to_string()));
        }

        let order = order.open(&self.default_source);
        self.store.insert(&order).await?;

        tracing::info!(order_id = %order.id, source = %order.source, "Order captured");

        if let Some(telemetry) = &self.telemetry {
            let event = format!("Capture Order {}: {}", order.source, order.id);
            if let Err(e) = telemetry.track_event(&event).await {
                tracing::warn!(error = %e, order_id = %order.id, "Failed to track capture event");
            }
            if let Err(e) = telemetry.track_trace(&Utc::now().to_rfc3339()).await {
                tracing::warn!(error = %e, order_id = %order.id, "Failed to track capture trace");
            }
        }

        if let Some(notifier) = &self.notifier {
            let event = OrderEvent::open(&order.id, &order.source, &self.hostname, Utc::now());
            if let Err(e) = notifier.notify(&event).await {
                tracing::warn!(
                    error = %e,
                    order_id = %order.id,
                    url = %notifier.url(),
                    "Failed to notify event hub"
                );
            }
        }

        Ok(order.id)
    }

    /// Look up a previously captured order.
    #[instrument(name = "orders::get", skip(self))]
    pub async fn get(&self, id: &str) -> Result<Order, AppError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::OrderNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};
    use async_trait::async_trait;

    struct FailingStore;

    #[async_trait]
    impl OrderStore for FailingStore {
        async fn insert(&self, _order: &Order) -> Result<(), StoreError> {
            Err(StoreError::Insert("unavailable".to_string()))
        }

        async fn get(&self, _id: &str) -> Result<Option<Order>, StoreError> {
            Err(StoreError::Query("unavailable".to_string()))
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Connection("unavailable".to_string()))
        }

        fn backend(&self) -> &'static str {
            "failing"
        }
    }

    fn service(store: Arc<dyn OrderStore>) -> OrderService {
        OrderService::new(store, None, None, "aks", "pod-1")
    }

    fn order(email: &str, source: &str) -> Order {
        Order {
            email_address: email.to_string(),
            source: source.to_string(),
            product: "Widget".to_string(),
            total: 9.99,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_capture_stores_open_order() {
        let store = MemoryStore::default();
        let service = service(Arc::new(store.clone()));

        let id = service.capture(order("a@b.c", "string")).await.unwrap();
        let stored = store.get(&id).await.unwrap().unwrap();

        assert_eq!(stored.id, id);
        assert_eq!(stored.status, "Open");
        assert_eq!(stored.source, "aks");
        assert_eq!(stored.product, "Widget");
    }

    #[tokio::test]
    async fn test_capture_rejects_missing_email() {
        let store = MemoryStore::default();
        let service = service(Arc::new(store.clone()));

        let err = service.capture(order("  ", "web")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_capture_reports_store_failure() {
        let service = service(Arc::new(FailingStore));
        let err = service.capture(order("a@b.c", "web")).await.unwrap_err();
        assert!(matches!(err, AppError::Store(StoreError::Insert(_))));
    }

    #[tokio::test]
    async fn test_get_unknown_order_is_not_found() {
        let service = service(Arc::new(MemoryStore::default()));
        let err = service.get("missing").await.unwrap_err();
        assert!(matches!(err, AppError::OrderNotFound(id) if id == "missing"));
    }
}
