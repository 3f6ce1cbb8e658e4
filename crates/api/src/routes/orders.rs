//! Order read and delete endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use checkout::NotificationGateway;
use common::OrderId;
use ordering::{Order, OrderStore, OrderingError};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Option<OrderId>,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub address_line: String,
    pub country: String,
    pub total_price: Decimal,
    pub created_date: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub last_modified_date: Option<DateTime<Utc>>,
    pub last_modified_by: Option<String>,
    pub deleted: bool,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id(),
            user_name: order.user_name().to_string(),
            first_name: order.first_name().to_string(),
            last_name: order.last_name().to_string(),
            email_address: order.email_address().to_string(),
            address_line: order.address_line().to_string(),
            country: order.country().to_string(),
            total_price: order.total_price(),
            created_date: order.created_date(),
            created_by: order.created_by().map(str::to_string),
            last_modified_date: order.last_modified_date(),
            last_modified_by: order.last_modified_by().map(str::to_string),
            deleted: order.is_deleted(),
        }
    }
}

fn parse_order_id(path: Result<Path<i64>, PathRejection>) -> Result<OrderId, ApiError> {
    let Path(raw) = path.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if raw <= 0 {
        return Err(ApiError::BadRequest(format!("Invalid order id: {raw}")));
    }
    Ok(OrderId::new(raw))
}

/// Distinguishes an unknown order from a tombstoned one.
async fn missing<S: OrderStore>(store: &S, id: OrderId) -> ApiError {
    match store.find(id).await {
        Ok(Some(order)) if order.is_deleted() => {
            ApiError::Conflict(format!("Order {id} has been deleted"))
        }
        Ok(_) => ApiError::NotFound(format!("Order {id} not found")),
        Err(e) => ApiError::Ordering(e.into()),
    }
}

/// GET /orders: list live orders.
#[tracing::instrument(skip(state))]
pub async fn list<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
) -> Result<Json<Vec<OrderResponse>>, ApiError>
where
    S: OrderStore + Clone + 'static,
    N: NotificationGateway + 'static,
{
    let orders = state.repository.list().await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// GET /orders/{id}: load one live order.
#[tracing::instrument(skip(state, path))]
pub async fn get<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: OrderStore + Clone + 'static,
    N: NotificationGateway + 'static,
{
    let id = parse_order_id(path)?;

    match state.repository.get(id).await? {
        Some(order) => Ok(Json(OrderResponse::from(&order))),
        None => Err(missing(state.repository.store(), id).await),
    }
}

/// GET /orders/user/{user_name}: live orders of one user.
#[tracing::instrument(skip(state))]
pub async fn by_user_name<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    Path(user_name): Path<String>,
) -> Result<Json<Vec<OrderResponse>>, ApiError>
where
    S: OrderStore + Clone + 'static,
    N: NotificationGateway + 'static,
{
    let orders = state.repository.orders_by_user_name(&user_name).await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// DELETE /orders/{id}: tombstone an order on behalf of the request actor.
#[tracing::instrument(skip(state, headers, path))]
pub async fn delete<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: OrderStore + Clone + 'static,
    N: NotificationGateway + 'static,
{
    let id = parse_order_id(path)?;
    let actor = state.actor_for(&headers);

    match state.repository.delete(id, &actor).await {
        Ok(tombstone) => Ok(Json(OrderResponse::from(&tombstone))),
        Err(OrderingError::NotFound(_)) => Err(missing(state.repository.store(), id).await),
        Err(e) => Err(e.into()),
    }
}
