//! Checkout orchestrator.

use common::{Actor, OrderId};
use ordering::{Order, OrderRepository, OrderStore};
use serde::Serialize;

use crate::command::CheckoutOrder;
use crate::error::Result;
use crate::notification::{Email, NotificationGateway};
use crate::state::{CheckoutState, NotificationOutcome};

/// Subject line of the order confirmation email.
pub const CONFIRMATION_SUBJECT: &str = "Order Confirmation";

/// Everything a finished checkout produced.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    pub order: Order,
    pub notification: NotificationOutcome,
    pub state: CheckoutState,
}

/// Orchestrates the checkout use case.
///
/// The orchestrator persists the order first and only then attempts the
/// confirmation email. Once persisted, the order stays persisted whatever
/// the gateway does.
pub struct CheckoutOrchestrator<S, N>
where
    S: OrderStore,
    N: NotificationGateway,
{
    repository: OrderRepository<S>,
    notifications: N,
}

impl<S, N> CheckoutOrchestrator<S, N>
where
    S: OrderStore,
    N: NotificationGateway,
{
    /// Creates a new checkout orchestrator.
    pub fn new(repository: OrderRepository<S>, notifications: N) -> Self {
        Self {
            repository,
            notifications,
        }
    }

    /// Returns the order repository.
    pub fn repository(&self) -> &OrderRepository<S> {
        &self.repository
    }

    /// Handles a checkout request and returns the new order's identifier.
    pub async fn handle(&self, request: CheckoutOrder, actor: &Actor) -> Result<OrderId> {
        Ok(self.handle_with_receipt(request, actor).await?.order_id)
    }

    /// Handles a checkout request and reports the state it ended in.
    ///
    /// Fails only if the order could not be persisted, in which case nothing
    /// was written and no email was attempted.
    #[tracing::instrument(skip(self, request, actor), fields(actor = %actor, user_name = %request.user_name))]
    pub async fn handle_with_receipt(
        &self,
        request: CheckoutOrder,
        actor: &Actor,
    ) -> Result<CheckoutReceipt> {
        metrics::counter!("checkout_total").increment(1);

        let mut state = CheckoutState::Draft;
        let (order_id, order) = match self.repository.place(Order::from(request), actor).await {
            Ok(placed) => placed,
            Err(e) => {
                metrics::counter!("checkout_failures_total").increment(1);
                tracing::warn!(error = %e, %state, "checkout failed, order not persisted");
                return Err(e.into());
            }
        };

        state = state.persist();
        tracing::info!(%order_id, "Order has been successfully created with id {}", order_id);

        let notification = self.notify(&order, order_id).await;
        state = state.record_notification(notification);
        tracing::debug!(%order_id, %state, "notification attempted");
        state = state.complete();

        Ok(CheckoutReceipt {
            order_id,
            order,
            notification,
            state,
        })
    }

    /// Builds the confirmation email for a persisted order.
    pub fn confirmation_email(order: &Order, order_id: OrderId) -> Email {
        Email::new(
            order.email_address(),
            CONFIRMATION_SUBJECT,
            format!("Order has been successfully created with id {order_id}"),
        )
    }

    async fn notify(&self, order: &Order, order_id: OrderId) -> NotificationOutcome {
        let email = Self::confirmation_email(order, order_id);

        match self.notifications.send(&email).await {
            Ok(()) => NotificationOutcome::Sent,
            Err(e) => {
                metrics::counter!("checkout_notification_failures_total").increment(1);
                tracing::error!(
                    %order_id,
                    "Order {} failed due to an error with the mail service: {}",
                    order_id,
                    e
                );
                NotificationOutcome::Failed
            }
        }
    }
}
