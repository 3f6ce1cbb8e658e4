//! Shared application state and per-request actor resolution.

use axum::http::HeaderMap;
use checkout::{CheckoutOrchestrator, NotificationGateway};
use common::Actor;
use ordering::{OrderRepository, OrderStore};

/// Header naming the identity a request acts on behalf of.
pub const ACTOR_HEADER: &str = "x-actor";

/// Shared application state accessible from all handlers.
pub struct AppState<S: OrderStore, N: NotificationGateway> {
    pub orchestrator: CheckoutOrchestrator<S, N>,
    pub repository: OrderRepository<S>,
    pub service_actor: Actor,
}

impl<S, N> AppState<S, N>
where
    S: OrderStore + Clone,
    N: NotificationGateway,
{
    /// Creates the state over one order store shared by checkout and reads.
    pub fn new(store: S, notifications: N, service_actor: Actor) -> Self {
        let repository = OrderRepository::new(store);
        Self {
            orchestrator: CheckoutOrchestrator::new(repository.clone(), notifications),
            repository,
            service_actor,
        }
    }

    /// Resolves the actor for a request: the `x-actor` header when present,
    /// otherwise the configured service identity.
    pub fn actor_for(&self, headers: &HeaderMap) -> Actor {
        headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(Actor::new)
            .unwrap_or_else(|| self.service_actor.clone())
    }
}
