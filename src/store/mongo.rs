//! MongoDB-backed `OrderStore` (Azure Cosmos DB Mongo API compatible).

use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, Credential, ServerAddress, Tls, TlsOptions};
use mongodb::{Client, Collection, Database};

use super::{OrderStore, StoreError};
use crate::config::{DatabaseConfig, ORDERS_COLLECTION};
use crate::models::{Order, StoredOrder};

/// Server error code for a duplicate key on insert
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Orders collection handle. The driver pools connections internally, so
/// clones are cheap and share sockets.
#[derive(Clone, Debug)]
pub struct MongoStore {
    database: Database,
    orders: Collection<StoredOrder>,
}

impl MongoStore {
    /// Build a client from configuration.
    ///
    /// The driver connects lazily; call [`OrderStore::ping`] to verify the
    /// server is reachable.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let name = config
            .name
            .clone()
            .ok_or_else(|| StoreError::Connection("database name not configured".to_string()))?;
        let host = config
            .host()
            .ok_or_else(|| StoreError::Connection("database host not configured".to_string()))?;

        let tls = if config.insecure {
            Tls::Disabled
        } else {
            Tls::Enabled(TlsOptions::default())
        };

        let credential = config.password.as_ref().map(|password| {
            Credential::builder()
                .username(config.username())
                .password(password.clone())
                .source(name.clone())
                .build()
        });

        // Cosmos DB does not support retryable writes
        let options = ClientOptions::builder()
            .hosts(vec![ServerAddress::Tcp {
                host: host.clone(),
                port: Some(config.port()),
            }])
            .credential(credential)
            .tls(tls)
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds()))
            .retry_writes(false)
            .app_name(env!("CARGO_PKG_NAME").to_string())
            .build();

        let client = Client::with_options(options)?;
        let database = client.database(&name);
        let orders = database.collection::<StoredOrder>(ORDERS_COLLECTION);

        tracing::info!(
            host = %host,
            port = config.port(),
            database = %name,
            tls = !config.insecure,
            "MongoDB client configured"
        );

        Ok(Self { database, orders })
    }
}

fn insert_error(id: &str, e: mongodb::error::Error) -> StoreError {
    match e.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY_CODE => {
            StoreError::Duplicate(id.to_string())
        }
        _ => StoreError::Insert(e.to_string()),
    }
}

#[async_trait]
impl OrderStore for MongoStore {
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        let document = StoredOrder::from(order.clone());
        self.orders
            .insert_one(document)
            .await
            .map_err(|e| insert_error(&order.id, e))?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Order>, StoreError> {
        let found = self
            .orders
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(found.map(Order::from))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreBackend;

    fn config() -> DatabaseConfig {
        DatabaseConfig {
            backend: StoreBackend::Mongo,
            name: Some("orders".to_string()),
            host: Some("127.0.0.1".to_string()),
            port: Some(27017),
            password: Some("pw".to_string()),
            insecure: true,
            connect_timeout_seconds: Some(1),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_connect_builds_client_without_contacting_server() {
        let store = MongoStore::connect(&config()).await.unwrap();
        assert_eq!(store.backend(), "mongodb");
        assert_eq!(store.orders.name(), ORDERS_COLLECTION);
    }

    #[tokio::test]
    async fn test_connect_requires_name() {
        let config = DatabaseConfig {
            name: None,
            host: None,
            ..config()
        };
        let err = MongoStore::connect(&config).await.unwrap_err();
        assert!(matches!(err, StoreError::Connection(_)));
    }
}
