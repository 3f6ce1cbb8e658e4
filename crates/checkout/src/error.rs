//! Checkout error types.

use ordering::OrderingError;
use thiserror::Error;

/// Errors that fail a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The order could not be persisted; nothing was written.
    #[error("Persistence error: {0}")]
    Persistence(#[from] OrderingError),
}

/// Errors reported by a notification gateway.
///
/// These never fail a checkout; the orchestrator logs and discards them.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The mail service could not be reached or refused the message.
    #[error("Mail service unavailable: {0}")]
    Unavailable(String),

    /// The message was rejected as undeliverable.
    #[error("Message rejected: {0}")]
    Rejected(String),
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
