//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{body::Body, http::Request, Router};
use captureorder::config::AppConfig;
use captureorder::routes::create_router;
use captureorder::service::OrderService;
use captureorder::state::AppState;
use captureorder::store::{MemoryStore, OrderStore};

/// Memory-backed config; `extra` is appended verbatim to the TOML.
pub fn config(extra: &str) -> AppConfig {
    let toml = format!(
        r#"
[http]
host = "127.0.0.1"
port = 0

[database]
backend = "memory"

[order]
source = "integration"

[instance]
hostname = "test-host"

{}
"#,
        extra
    );
    AppConfig::from_toml_with_env(&toml, |_| None).expect("test config should parse")
}

/// Router plus a handle on the store behind it.
pub fn app(config: AppConfig) -> (Router, MemoryStore) {
    let store = MemoryStore::default();
    let router = app_with_store(config, Arc::new(store.clone()));
    (router, store)
}

/// Router backed by an arbitrary store.
pub fn app_with_store(config: AppConfig, store: Arc<dyn OrderStore>) -> Router {
    let orders = OrderService::from_config(&config, store, reqwest::Client::new());
    create_router(AppState::new(orders))
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
