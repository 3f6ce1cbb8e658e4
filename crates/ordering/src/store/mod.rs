//! Storage seam for orders and its implementations.

mod memory;
mod postgres;

pub use memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;

use async_trait::async_trait;
use common::OrderId;
use persistence::{Result, StoreWriter};

use crate::order::{Order, OrderQuery};

/// Durable order storage.
///
/// Writes go through [`StoreWriter::write`] as atomic batches. Reads return
/// stored records as they are, tombstones included unless a query filters
/// them out.
#[async_trait]
pub trait OrderStore: StoreWriter<Entity = Order> {
    /// Finds an order by identifier, tombstoned or not.
    async fn find(&self, id: OrderId) -> Result<Option<Order>>;

    /// Returns the orders matching a query, ordered by identifier.
    async fn query(&self, query: OrderQuery) -> Result<Vec<Order>>;

    /// Counts every stored order, tombstones included.
    async fn count(&self) -> Result<u64>;
}
