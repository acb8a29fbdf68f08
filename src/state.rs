//! Shared application state for request handlers.

use crate::service::OrderService;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub orders: OrderService,
}

impl AppState {
    pub fn new(orders: OrderService) -> Self {
        Self { orders }
    }
}
