//! Persistence gateway shared by the audited entity stores.
//!
//! Pending changes are collected as an explicit list of `(intent, entity)`
//! pairs, stamped with audit metadata, and handed to a store writer as one
//! atomic batch.

pub mod clock;
pub mod entity;
pub mod error;
pub mod mutation;
pub mod stamper;
pub mod store;
pub mod unit_of_work;

pub use clock::{Clock, SystemClock};
pub use common::Actor;
pub use entity::{AuditFields, Entity};
pub use error::{Result, StoreError};
pub use mutation::{Intent, Mutation};
pub use stamper::AuditStamper;
pub use store::{StoreWriter, validate_batch};
pub use unit_of_work::{CommitOutcome, UnitOfWork};
