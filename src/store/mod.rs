//! Persistence for captured orders.
//!
//! `OrderStore` is the only contract the order workflow depends on. The
//! MongoDB backend targets Azure Cosmos DB's Mongo API; the memory backend
//! keeps orders in-process for local runs and tests.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{DatabaseConfig, StoreBackend};
use crate::models::Order;

/// Storage backend contract for orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order. The order must already carry its id.
    async fn insert(&self, order: &Order) -> Result<(), StoreError>;

    /// Fetch an order by id.
    async fn get(&self, id: &str) -> Result<Option<Order>, StoreError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short name used in logs
    fn backend(&self) -> &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Problem inserting data: {0}")]
    Insert(String),

    #[error("Problem reading data: {0}")]
    Query(String),

    #[error("Duplicate order id: {0}")]
    Duplicate(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        StoreError::Connection(e.to_string())
    }
}

/// Build the store selected in configuration.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn OrderStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory order store; orders are lost on restart");
            Ok(Arc::new(MemoryStore::default()))
        }
        StoreBackend::Mongo => Ok(Arc::new(MongoStore::connect(config).await?)),
    }
}
