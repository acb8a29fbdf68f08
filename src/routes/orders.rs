//! Handlers for capturing and looking up orders.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::RequestId;
use crate::models::Order;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResponse {
    pub order_id: String,
}

/// Capture a new order
#[instrument(
    name = "orders::submit",
    skip(state, request_id, order),
    fields(request_id = %request_id.0)
)]
pub async fn submit(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(order): Json<Order>,
) -> Result<(StatusCode, Json<CaptureResponse>), AppError> {
    let order_id = state.orders.capture(order).await?;
    Ok((StatusCode::CREATED, Json(CaptureResponse { order_id })))
}

/// Fetch a captured order by id
#[instrument(name = "orders::view", skip(state), fields(order_id = %id))]
pub async fn view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(state.orders.get(&id).await?))
}
