//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p ordering --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use ordering::{
    Actor, Order, OrderQuery, OrderRepository, OrderStore, OrderingError, PostgresOrderStore,
    SeedOutcome,
};
use persistence::{Mutation, StoreError, StoreWriter};
use rust_decimal::Decimal;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_orders_table.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and an empty orders table
async fn get_test_store() -> PostgresOrderStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE orders RESTART IDENTITY")
        .execute(&pool)
        .await
        .unwrap();

    PostgresOrderStore::new(pool)
}

fn draft_order(user_name: &str) -> Order {
    Order::builder()
        .user_name(user_name)
        .first_name("Mehmet")
        .last_name("Ozkaya")
        .email_address("test@gmail.com")
        .address_line("Bahcelievler")
        .country("Turkey")
        .total_price(Decimal::new(35050, 2))
        .build()
}

#[tokio::test]
async fn add_and_get_round_trip() {
    let repo = OrderRepository::new(get_test_store().await);

    let order = repo
        .add(draft_order("David"), &Actor::new("checkout-api"))
        .await
        .unwrap();
    let loaded = repo.get(order.id().unwrap()).await.unwrap().unwrap();

    assert_eq!(loaded, order);
    assert_eq!(loaded.total_price(), Decimal::new(35050, 2));
    assert_eq!(loaded.created_by(), Some("checkout-api"));
    assert!(loaded.created_date().is_some());
    assert_eq!(loaded.last_modified_date(), None);
}

#[tokio::test]
async fn update_restamps_and_keeps_created() {
    let repo = OrderRepository::new(get_test_store().await);
    let created = repo
        .add(draft_order("David"), &Actor::new("alice"))
        .await
        .unwrap();

    let mut changed = created.clone();
    changed.set_total_price(Decimal::new(400, 0));
    let updated = repo.update(changed, &Actor::new("bob")).await.unwrap();

    assert_eq!(updated.total_price(), Decimal::new(400, 0));
    assert_eq!(updated.created_date(), created.created_date());
    assert_eq!(updated.created_by(), Some("alice"));
    assert_eq!(updated.last_modified_by(), Some("bob"));
    assert!(updated.last_modified_date() > created.created_date());
}

#[tokio::test]
async fn failing_batch_rolls_back() {
    let store = get_test_store().await;
    let repo = OrderRepository::new(store.clone());
    let existing = repo
        .add(draft_order("David"), &Actor::system())
        .await
        .unwrap();
    repo.delete(existing.id().unwrap(), &Actor::system())
        .await
        .unwrap();

    // Second mutation targets a tombstone, so the insert must not survive
    let result = store
        .write(vec![
            Mutation::create(draft_order("swn")),
            Mutation::update(existing),
        ])
        .await;

    assert!(matches!(result, Err(StoreError::Tombstoned { .. })));
    assert_eq!(store.count().await.unwrap(), 1);
    assert!(
        store
            .query(OrderQuery::for_user("swn").include_deleted())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn delete_tombstones_row() {
    let store = get_test_store().await;
    let repo = OrderRepository::new(store.clone());
    let order = repo
        .add(draft_order("David"), &Actor::system())
        .await
        .unwrap();
    let id = order.id().unwrap();

    let tombstone = repo.delete(id, &Actor::new("carol")).await.unwrap();

    assert!(tombstone.is_deleted());
    assert_eq!(tombstone.last_modified_by(), Some("carol"));
    assert!(repo.get(id).await.unwrap().is_none());
    assert!(store.find(id).await.unwrap().unwrap().is_deleted());

    let again = repo.delete(id, &Actor::system()).await;
    assert!(matches!(again, Err(OrderingError::NotFound(_))));
}

#[tokio::test]
async fn query_filters_by_user_and_pages() {
    let repo = OrderRepository::new(get_test_store().await);
    for user in ["David", "swn", "David", "David"] {
        repo.add(draft_order(user), &Actor::system()).await.unwrap();
    }

    let david = repo.orders_by_user_name("David").await.unwrap();
    assert_eq!(david.len(), 3);

    let page = repo
        .find(OrderQuery::for_user("David").offset(1).limit(1))
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id(), david[1].id());
}

#[tokio::test]
async fn add_ignores_caller_supplied_audit_fields() {
    let repo = OrderRepository::new(get_test_store().await);
    let draft: Order = serde_json::from_value(serde_json::json!({
        "id": null,
        "user_name": "David",
        "first_name": "Mehmet",
        "last_name": "Ozkaya",
        "email_address": "test@gmail.com",
        "address_line": "Bahcelievler",
        "country": "Turkey",
        "total_price": 350,
        "created_date": null,
        "created_by": null,
        "last_modified_date": "2001-01-01T00:00:00Z",
        "last_modified_by": "forger",
        "deleted": true
    }))
    .unwrap();

    let order = repo.add(draft, &Actor::new("alice")).await.unwrap();

    assert_eq!(order.created_by(), Some("alice"));
    assert_eq!(order.last_modified_date(), None);
    assert_eq!(order.last_modified_by(), None);
    assert!(!order.is_deleted());
    assert_eq!(repo.get(order.id().unwrap()).await.unwrap(), Some(order));
}

#[tokio::test]
async fn unbounded_limit_returns_every_order() {
    let repo = OrderRepository::new(get_test_store().await);
    for user in ["David", "swn"] {
        repo.add(draft_order(user), &Actor::system()).await.unwrap();
    }

    let all = repo
        .find(OrderQuery::new().limit(usize::MAX).offset(0))
        .await
        .unwrap();

    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn seed_runs_once() {
    let store = get_test_store().await;
    let repo = OrderRepository::new(store.clone());

    assert_eq!(
        repo.seed(&Actor::system()).await.unwrap(),
        SeedOutcome::Seeded(1)
    );
    assert_eq!(
        repo.seed(&Actor::system()).await.unwrap(),
        SeedOutcome::AlreadyPopulated
    );
    assert_eq!(store.count().await.unwrap(), 1);

    let seeded = repo.orders_by_user_name("David").await.unwrap();
    assert_eq!(seeded.len(), 1);
    assert_eq!(seeded[0].email_address(), "test@gmail.com");
}
