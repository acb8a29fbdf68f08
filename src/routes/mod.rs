//! HTTP routes.
//!
//! Order endpoints are stateful and sent with `Cache-Control: no-store`.
//! Request tracing is enabled via middleware that assigns a request ID to
//! every incoming request, so all logs within a request can be correlated.

pub mod health;
pub mod orders;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::CACHE_CONTROL_API;
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Creates the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let order_routes = Router::new()
        .route("/v1/order", post(orders::submit))
        .route("/v1/order/{id}", get(orders::view))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_API),
        ));

    // Health check - no caching, always fresh for liveness probes
    let health_routes = Router::new()
        .route("/healthz", get(health::health))
        .route("/health", get(health::health));

    Router::new()
        .merge(order_routes)
        .merge(health_routes)
        .with_state(state)
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
