//! Order aggregate and related types.

mod model;
mod query;

pub use model::{Order, OrderBuilder};
pub use query::OrderQuery;
