//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;
use ordering::OrderingError;
use persistence::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Resource exists but is in a state that forbids the request.
    Conflict(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Checkout failed before the order became durable.
    Checkout(CheckoutError),
    /// Order repository error.
    Ordering(OrderingError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Checkout(CheckoutError::Persistence(err)) => {
                tracing::error!(error = %err, "checkout could not persist order");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::Ordering(err) => ordering_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn ordering_error_to_response(err: OrderingError) -> (StatusCode, String) {
    let status = match &err {
        OrderingError::NotFound(_) | OrderingError::Store(StoreError::NotFound { .. }) => {
            StatusCode::NOT_FOUND
        }
        OrderingError::AlreadyPersisted(_)
        | OrderingError::Store(StoreError::Tombstoned { .. }) => StatusCode::CONFLICT,
        OrderingError::NotPersisted | OrderingError::Store(StoreError::InvalidMutation(_)) => {
            StatusCode::BAD_REQUEST
        }
        OrderingError::Store(_) => {
            tracing::error!(error = %err, "order store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<OrderingError> for ApiError {
    fn from(err: OrderingError) -> Self {
        ApiError::Ordering(err)
    }
}
