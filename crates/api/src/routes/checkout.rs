//! Checkout endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use checkout::{CheckoutOrder, NotificationGateway};
use common::OrderId;
use ordering::OrderStore;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub order_id: OrderId,
}

/// POST /checkout: persist the order, then attempt the confirmation email.
///
/// Responds 201 once the order is durable, whatever the email outcome.
#[tracing::instrument(skip(state, headers, payload))]
pub async fn create<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    headers: HeaderMap,
    payload: Result<Json<CheckoutOrder>, JsonRejection>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError>
where
    S: OrderStore + Clone + 'static,
    N: NotificationGateway + 'static,
{
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let actor = state.actor_for(&headers);

    let order_id = state.orchestrator.handle(request, &actor).await?;

    Ok((StatusCode::CREATED, Json(CheckoutResponse { order_id })))
}
