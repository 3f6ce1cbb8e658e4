//! Checkout orchestration for the ordering system.
//!
//! This crate turns a checkout request into a durable order and then
//! attempts one buyer notification:
//! 1. Map the request into a draft order
//! 2. Persist it through the audited order repository
//! 3. Send a confirmation email
//!
//! A failed notification is logged and counted but never undoes or fails
//! the checkout once the order is persisted.

pub mod command;
pub mod error;
pub mod notification;
pub mod orchestrator;
pub mod state;

pub use command::CheckoutOrder;
pub use error::{CheckoutError, NotificationError, Result};
pub use notification::{
    Email, InMemoryNotificationGateway, LogNotificationGateway, NotificationGateway,
};
pub use orchestrator::{CheckoutOrchestrator, CheckoutReceipt};
pub use state::{CheckoutState, NotificationOutcome};
