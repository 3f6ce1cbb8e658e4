//! Ordering error types.

use common::OrderId;
use persistence::StoreError;
use thiserror::Error;

/// Errors that can occur during order repository operations.
#[derive(Debug, Error)]
pub enum OrderingError {
    /// The store rejected or could not perform the commit.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// An order that already has an identifier was passed to `add`.
    #[error("Order {0} is already persisted")]
    AlreadyPersisted(OrderId),

    /// An order without an identifier was passed to `update`.
    #[error("Order has not been persisted yet")]
    NotPersisted,

    /// No live order exists with this identifier.
    #[error("Order not found: {0}")]
    NotFound(OrderId),
}

/// Convenience type alias for ordering results.
pub type Result<T> = std::result::Result<T, OrderingError>;
