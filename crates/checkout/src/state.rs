//! Checkout state machine.

use serde::{Deserialize, Serialize};

/// Result of the notification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationOutcome {
    /// The gateway accepted the email.
    Sent,

    /// The gateway failed; the failure was logged and discarded.
    Failed,
}

impl NotificationOutcome {
    /// Returns the outcome name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationOutcome::Sent => "Sent",
            NotificationOutcome::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for NotificationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The state of one checkout.
///
/// State transitions:
/// ```text
/// Draft ──► Persisted ──► NotificationAttempted(Sent | Failed) ──► Complete
/// ```
///
/// A checkout that fails to persist never leaves `Draft`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutState {
    /// The order exists only in memory.
    #[default]
    Draft,

    /// The order has an identifier and a created stamp.
    Persisted,

    /// The confirmation email was attempted.
    NotificationAttempted(NotificationOutcome),

    /// The checkout finished (terminal state).
    Complete,
}

impl CheckoutState {
    /// Returns true once the order is durable.
    pub fn is_persisted(&self) -> bool {
        !matches!(self, CheckoutState::Draft)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutState::Complete)
    }

    /// Records that the order was committed. Only leaves `Draft`.
    pub fn persist(self) -> Self {
        match self {
            CheckoutState::Draft => CheckoutState::Persisted,
            other => other,
        }
    }

    /// Records the outcome of the confirmation email. Only leaves `Persisted`.
    pub fn record_notification(self, outcome: NotificationOutcome) -> Self {
        match self {
            CheckoutState::Persisted => CheckoutState::NotificationAttempted(outcome),
            other => other,
        }
    }

    /// Finishes the checkout. Only leaves `NotificationAttempted`.
    pub fn complete(self) -> Self {
        match self {
            CheckoutState::NotificationAttempted(_) => CheckoutState::Complete,
            other => other,
        }
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Draft => "Draft",
            CheckoutState::Persisted => "Persisted",
            CheckoutState::NotificationAttempted(_) => "NotificationAttempted",
            CheckoutState::Complete => "Complete",
        }
    }
}

impl std::fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckoutState::NotificationAttempted(outcome) => {
                write!(f, "{}({})", self.as_str(), outcome)
            }
            _ => write!(f, "{}", self.as_str()),
        }
    }
}
