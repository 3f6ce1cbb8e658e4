pub mod types;

pub use types::{Actor, OrderId};
