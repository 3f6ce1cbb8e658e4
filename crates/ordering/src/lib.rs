//! Ordering layer: the order aggregate and its audited repository.
//!
//! This crate provides:
//! - The `Order` aggregate root carrying the audit entity base
//! - The `OrderStore` storage seam with in-memory and PostgreSQL backends
//! - `OrderRepository`, which routes every write through a unit of work
//! - First-run seeding of the order collection

pub mod error;
pub mod order;
pub mod repository;
pub mod seed;
pub mod store;

pub use common::{Actor, OrderId};
pub use error::{OrderingError, Result};
pub use order::{Order, OrderBuilder, OrderQuery};
pub use repository::OrderRepository;
pub use seed::{SeedOutcome, preconfigured_orders};
pub use store::{InMemoryOrderStore, OrderStore, PostgresOrderStore};
