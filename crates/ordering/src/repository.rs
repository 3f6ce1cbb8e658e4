//! Order repository: order-scoped reads and audited writes.

use common::{Actor, OrderId};
use persistence::{AuditStamper, CommitOutcome, StoreError, UnitOfWork};

use crate::error::{OrderingError, Result};
use crate::order::{Order, OrderQuery};
use crate::seed::{SeedOutcome, preconfigured_orders};
use crate::store::OrderStore;

/// Repository for the order aggregate.
///
/// Every write is its own unit of work: the order is tagged with an intent,
/// stamped on behalf of the given actor, and written atomically. Reads hide
/// tombstoned orders.
#[derive(Debug, Clone)]
pub struct OrderRepository<S: OrderStore> {
    store: S,
    stamper: AuditStamper,
}

impl<S: OrderStore> OrderRepository<S> {
    /// Creates a repository stamping with the system clock.
    pub fn new(store: S) -> Self {
        Self::with_stamper(store, AuditStamper::new())
    }

    /// Creates a repository with a specific stamper.
    pub fn with_stamper(store: S, stamper: AuditStamper) -> Self {
        Self { store, stamper }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persists a draft order and returns it with identifier and created stamp.
    pub async fn add(&self, order: Order, actor: &Actor) -> Result<Order> {
        let (_, order) = self.place(order, actor).await?;
        Ok(order)
    }

    /// Persists a draft order and returns the identifier the store assigned
    /// alongside the stamped order.
    #[tracing::instrument(skip(self, order, actor), fields(actor = %actor, user_name = %order.user_name()))]
    pub async fn place(&self, order: Order, actor: &Actor) -> Result<(OrderId, Order)> {
        if let Some(id) = order.id() {
            return Err(OrderingError::AlreadyPersisted(id));
        }

        let mut uow = UnitOfWork::new(&self.store, &self.stamper);
        uow.register_new(order);
        let order = Self::single(uow.commit(actor).await?)?;
        let id = order.id().ok_or_else(|| {
            OrderingError::Store(StoreError::InvalidMutation(
                "store assigned no identifier to a created order".to_string(),
            ))
        })?;

        tracing::info!(order_id = %id, "order persisted");
        Ok((id, order))
    }

    /// Loads a live order by identifier.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let order = self.store.find(id).await?;
        Ok(order.filter(|o| !o.is_deleted()))
    }

    /// Lists every live order, ordered by identifier.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Order>> {
        Ok(self.store.query(OrderQuery::new()).await?)
    }

    /// Lists the live orders of one user.
    #[tracing::instrument(skip(self))]
    pub async fn orders_by_user_name(&self, user_name: &str) -> Result<Vec<Order>> {
        Ok(self.store.query(OrderQuery::for_user(user_name)).await?)
    }

    /// Runs a filtered read.
    #[tracing::instrument(skip(self))]
    pub async fn find(&self, query: OrderQuery) -> Result<Vec<Order>> {
        Ok(self.store.query(query).await?)
    }

    /// Replaces a persisted order and restamps its last-modified fields.
    #[tracing::instrument(skip(self, order, actor), fields(actor = %actor, order_id = ?order.id()))]
    pub async fn update(&self, order: Order, actor: &Actor) -> Result<Order> {
        if order.id().is_none() {
            return Err(OrderingError::NotPersisted);
        }

        let mut uow = UnitOfWork::new(&self.store, &self.stamper);
        uow.register_modified(order);
        Self::single(uow.commit(actor).await?)
    }

    /// Tombstones a live order, stamping it as modified by `actor`.
    #[tracing::instrument(skip(self, actor), fields(actor = %actor))]
    pub async fn delete(&self, id: OrderId, actor: &Actor) -> Result<Order> {
        let order = self.get(id).await?.ok_or(OrderingError::NotFound(id))?;

        let mut uow = UnitOfWork::new(&self.store, &self.stamper);
        uow.register_deleted(order);
        let tombstone = Self::single(uow.commit(actor).await?)?;

        tracing::info!(order_id = %id, "order tombstoned");
        Ok(tombstone)
    }

    /// Populates an empty order collection with the preconfigured fixtures.
    ///
    /// Does nothing once the collection holds any order, tombstones included.
    #[tracing::instrument(skip(self, actor), fields(actor = %actor))]
    pub async fn seed(&self, actor: &Actor) -> Result<SeedOutcome> {
        if self.store.count().await? > 0 {
            tracing::debug!("order collection already populated, skipping seed");
            return Ok(SeedOutcome::AlreadyPopulated);
        }

        let mut uow = UnitOfWork::new(&self.store, &self.stamper);
        for order in preconfigured_orders() {
            uow.register_new(order);
        }
        let outcome = uow.commit(actor).await?;

        tracing::info!(seeded = outcome.affected, "seeded order collection");
        Ok(SeedOutcome::Seeded(outcome.affected))
    }

    fn single(outcome: CommitOutcome<Order>) -> Result<Order> {
        outcome.entities.into_iter().next().ok_or_else(|| {
            OrderingError::Store(StoreError::InvalidMutation(
                "store returned no record for a single-order commit".to_string(),
            ))
        })
    }
}
