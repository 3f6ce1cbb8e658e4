use serde::{Deserialize, Serialize};

/// Surrogate identifier of a persisted order.
///
/// Assigned by the backing store on the first successful commit and never
/// changed afterwards. A draft order has no identifier at all, so there is no
/// "unassigned" sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i64);

impl OrderId {
    /// Creates an order ID from a raw store value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw store value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for OrderId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<OrderId> for i64 {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

/// Identity recorded in audit fields as the author of a mutation.
///
/// Passed explicitly into every commit so the audit trail names whoever
/// issued the request rather than whichever account runs the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    /// Fallback used when no identity can be determined.
    pub const SYSTEM: &'static str = "system";

    /// Creates an actor from a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Identity of the account running this process (`USER` or `USERNAME`).
    pub fn from_process() -> Self {
        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .ok()
            .filter(|name| !name.trim().is_empty())
            .map(Self)
            .unwrap_or_else(Self::system)
    }

    /// The built-in system actor.
    pub fn system() -> Self {
        Self(Self::SYSTEM.to_string())
    }

    /// Returns the actor name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Actor {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Actor {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for Actor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
