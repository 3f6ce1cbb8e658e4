use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::OrderId;
use persistence::{Entity, Intent, Mutation, Result, StoreError, StoreWriter, validate_batch};
use tokio::sync::RwLock;

use super::OrderStore;
use crate::order::{Order, OrderQuery};

#[derive(Debug, Clone, Default)]
struct Table {
    orders: BTreeMap<OrderId, Order>,
    last_id: i64,
}

/// In-memory order store.
///
/// Each batch is applied to a staged copy of the table under the write lock
/// and swapped in only if every mutation succeeds.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    table: Arc<RwLock<Table>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to reject every write.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of stored orders, tombstones included.
    pub async fn order_count(&self) -> usize {
        self.table.read().await.orders.len()
    }
}

fn not_found(id: OrderId) -> StoreError {
    StoreError::NotFound {
        entity_type: Order::entity_type(),
        id: id.to_string(),
    }
}

fn tombstoned(id: OrderId) -> StoreError {
    StoreError::Tombstoned {
        entity_type: Order::entity_type(),
        id: id.to_string(),
    }
}

impl Table {
    fn live(&self, id: OrderId) -> Result<&Order> {
        let stored = self.orders.get(&id).ok_or_else(|| not_found(id))?;
        if stored.is_deleted() {
            return Err(tombstoned(id));
        }
        Ok(stored)
    }

    fn apply(&mut self, intent: Intent, order: Order) -> Result<Order> {
        match (intent, order.id()) {
            (Intent::Create, _) => {
                self.last_id += 1;
                let id = OrderId::new(self.last_id);
                let audit = order.audit().for_insert();
                let inserted = Order::restore(id, order, audit);
                self.orders.insert(id, inserted.clone());
                Ok(inserted)
            }
            (Intent::Update, Some(id)) => {
                let audit = self.live(id)?.audit().replaced_by(order.audit());
                let replaced = Order::restore(id, order, audit);
                self.orders.insert(id, replaced.clone());
                Ok(replaced)
            }
            (Intent::Delete, Some(id)) => {
                let stored = self.live(id)?.clone();
                let mut audit = stored.audit().replaced_by(order.audit());
                audit.tombstone();
                let tombstone = Order::restore(id, stored, audit);
                self.orders.insert(id, tombstone.clone());
                Ok(tombstone)
            }
            (intent, None) => Err(StoreError::InvalidMutation(format!(
                "cannot {intent} an order without an identifier"
            ))),
        }
    }
}

#[async_trait]
impl StoreWriter for InMemoryOrderStore {
    type Entity = Order;

    async fn write(&self, batch: Vec<Mutation<Order>>) -> Result<Vec<Order>> {
        validate_batch(&batch)?;

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "order store is rejecting writes".to_string(),
            ));
        }

        let mut table = self.table.write().await;
        let mut staged = table.clone();

        let mut written = Vec::with_capacity(batch.len());
        for mutation in batch {
            let (intent, order) = mutation.into_parts();
            written.push(staged.apply(intent, order)?);
        }

        *table = staged;
        Ok(written)
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn find(&self, id: OrderId) -> Result<Option<Order>> {
        let table = self.table.read().await;
        Ok(table.orders.get(&id).cloned())
    }

    async fn query(&self, query: OrderQuery) -> Result<Vec<Order>> {
        let table = self.table.read().await;
        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX);

        Ok(table
            .orders
            .values()
            .filter(|order| query.matches(order))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.table.read().await.orders.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use persistence::{Actor, AuditStamper};
    use rust_decimal::Decimal;

    use super::*;

    fn draft(user: &str) -> Order {
        Order::builder()
            .user_name(user)
            .email_address(format!("{user}@example.com"))
            .total_price(Decimal::new(100, 0))
            .build()
    }

    async fn insert(store: &InMemoryOrderStore, user: &str) -> Order {
        let mut batch = vec![Mutation::create(draft(user))];
        AuditStamper::new().stamp(&mut batch, &Actor::new("tester"));
        store.write(batch).await.unwrap().remove(0)
    }

    #[tokio::test]
    async fn create_assigns_sequential_identifiers() {
        let store = InMemoryOrderStore::new();

        let first = insert(&store, "a").await;
        let second = insert(&store, "b").await;

        assert_eq!(first.id(), Some(OrderId::new(1)));
        assert_eq!(second.id(), Some(OrderId::new(2)));
        assert_eq!(store.order_count().await, 2);
    }

    #[tokio::test]
    async fn failed_batch_consumes_no_identifier() {
        let store = InMemoryOrderStore::new();
        let ghost = Order::restore(OrderId::new(50), draft("ghost"), Default::default());

        let result = store
            .write(vec![Mutation::create(draft("a")), Mutation::update(ghost)])
            .await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert_eq!(store.order_count().await, 0);

        let order = insert(&store, "b").await;
        assert_eq!(order.id(), Some(OrderId::new(1)));
    }

    #[tokio::test]
    async fn create_stores_fresh_audit_fields() {
        let store = InMemoryOrderStore::new();
        let mut draft = draft("a");
        *draft.audit_fields_mut() = persistence::AuditFields::restore(
            None,
            Some("tester".into()),
            None,
            Some("forger".into()),
            true,
        );

        let created = store
            .write(vec![Mutation::create(draft)])
            .await
            .unwrap()
            .remove(0);

        assert_eq!(created.created_by(), Some("tester"));
        assert_eq!(created.last_modified_by(), None);
        assert!(!created.is_deleted());
        assert_eq!(store.find(OrderId::new(1)).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn update_keeps_stored_created_stamp() {
        let store = InMemoryOrderStore::new();
        let created = insert(&store, "a").await;

        let forged = Order::restore(
            created.id().unwrap(),
            draft("a"),
            persistence::AuditFields::restore(None, Some("forger".into()), None, None, false),
        );
        let updated = store
            .write(vec![Mutation::update(forged)])
            .await
            .unwrap()
            .remove(0);

        assert_eq!(updated.created_by(), Some("tester"));
        assert_eq!(updated.created_date(), created.created_date());
    }

    #[tokio::test]
    async fn delete_tombstones_stored_record() {
        let store = InMemoryOrderStore::new();
        let created = insert(&store, "a").await;
        let id = created.id().unwrap();

        let mut changed = created.clone();
        changed.set_email_address("changed@example.com");
        store.write(vec![Mutation::delete(changed)]).await.unwrap();

        let stored = store.find(id).await.unwrap().unwrap();
        assert!(stored.is_deleted());
        assert_eq!(stored.email_address(), "a@example.com");
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.query(OrderQuery::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn writes_to_tombstone_are_rejected() {
        let store = InMemoryOrderStore::new();
        let created = insert(&store, "a").await;
        store
            .write(vec![Mutation::delete(created.clone())])
            .await
            .unwrap();

        let result = store.write(vec![Mutation::update(created)]).await;
        assert!(matches!(result, Err(StoreError::Tombstoned { .. })));
    }

    #[tokio::test]
    async fn query_filters_and_pages() {
        let store = InMemoryOrderStore::new();
        for user in ["a", "b", "a", "a"] {
            insert(&store, user).await;
        }

        let all_a = store.query(OrderQuery::for_user("a")).await.unwrap();
        assert_eq!(all_a.len(), 3);

        let page = store
            .query(OrderQuery::for_user("a").offset(1).limit(1))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id(), Some(OrderId::new(3)));
    }

    #[tokio::test]
    async fn fail_writes_rejects_without_changes() {
        let store = InMemoryOrderStore::new();
        store.set_fail_writes(true);

        let result = store.write(vec![Mutation::create(draft("a"))]).await;

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
