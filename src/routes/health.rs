//! Health check endpoint for container orchestration.
//!
//! A liveness probe only: it answers as long as the process can serve HTTP
//! and does not touch the order store.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub response: &'static str,
}

/// Health check handler.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        response: "i'm alive!",
    })
}
