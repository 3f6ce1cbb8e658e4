//! Notification gateway trait and implementations.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::NotificationError;

/// A single outgoing email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Email {
    /// Creates a new email.
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Trait for delivering buyer notifications.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Sends one email. Delivery is attempted once.
    async fn send(&self, email: &Email) -> Result<(), NotificationError>;
}

#[async_trait]
impl<N: NotificationGateway + ?Sized> NotificationGateway for Arc<N> {
    async fn send(&self, email: &Email) -> Result<(), NotificationError> {
        (**self).send(email).await
    }
}

#[derive(Debug, Default)]
struct InMemoryNotificationState {
    sent: Vec<Email>,
    attempts: usize,
    fail_on_send: bool,
}

/// In-memory notification gateway for testing.
///
/// Records every delivered email and can be configured to reject sends.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationGateway {
    state: Arc<RwLock<InMemoryNotificationState>>,
}

impl InMemoryNotificationGateway {
    /// Creates a new in-memory notification gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gateway that rejects every send.
    pub async fn failing() -> Self {
        let gateway = Self::new();
        gateway.set_fail_on_send(true).await;
        gateway
    }

    /// Configures the gateway to fail on subsequent send calls.
    pub async fn set_fail_on_send(&self, fail: bool) {
        self.state.write().await.fail_on_send = fail;
    }

    /// Returns every email delivered so far.
    pub async fn sent(&self) -> Vec<Email> {
        self.state.read().await.sent.clone()
    }

    /// Returns the number of delivered emails.
    pub async fn sent_count(&self) -> usize {
        self.state.read().await.sent.len()
    }

    /// Returns the number of send attempts, failed ones included.
    pub async fn attempt_count(&self) -> usize {
        self.state.read().await.attempts
    }
}

#[async_trait]
impl NotificationGateway for InMemoryNotificationGateway {
    async fn send(&self, email: &Email) -> Result<(), NotificationError> {
        let mut state = self.state.write().await;
        state.attempts += 1;

        if state.fail_on_send {
            return Err(NotificationError::Unavailable(
                "Mail service unavailable".to_string(),
            ));
        }

        state.sent.push(email.clone());
        Ok(())
    }
}

/// Gateway that writes each email to the tracing log instead of sending it.
///
/// Used by the service binary when no mail transport is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotificationGateway;

impl LogNotificationGateway {
    /// Creates a new logging gateway.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationGateway for LogNotificationGateway {
    async fn send(&self, email: &Email) -> Result<(), NotificationError> {
        if email.to.is_empty() {
            return Err(NotificationError::Rejected(
                "email has no recipient".to_string(),
            ));
        }

        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.body,
            "email dispatched"
        );
        Ok(())
    }
}
