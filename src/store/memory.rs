//! Thread-safe in-memory `OrderStore` for local development and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{OrderStore, StoreError};
use crate::models::Order;

type OrderMap = Arc<RwLock<HashMap<String, Order>>>;

#[derive(Clone, Debug, Default)]
pub struct MemoryStore(OrderMap);

impl MemoryStore {
    /// Number of stored orders
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        let mut guard = self.0.write();
        if guard.contains_key(&order.id) {
            return Err(StoreError::Duplicate(order.id.clone()));
        }
        guard.insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Order>, StoreError> {
        Ok(self.0.read().get(id).cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
