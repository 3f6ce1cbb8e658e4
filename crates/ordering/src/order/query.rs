use super::Order;

/// Builder for filtered order reads.
///
/// Tombstoned orders are excluded unless `include_deleted` is set.
/// Results are ordered by identifier.
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    /// Filter by user name (exact match).
    pub user_name: Option<String>,

    /// Filter by email address (exact match).
    pub email_address: Option<String>,

    /// Filter by country (exact match).
    pub country: Option<String>,

    /// Include tombstoned orders.
    pub include_deleted: bool,

    /// Maximum number of orders to return.
    pub limit: Option<usize>,

    /// Number of orders to skip.
    pub offset: Option<usize>,
}

impl OrderQuery {
    /// Creates a query matching every live order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for the orders of one user.
    pub fn for_user(user_name: impl Into<String>) -> Self {
        Self::new().user_name(user_name)
    }

    pub fn user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    pub fn email_address(mut self, email_address: impl Into<String>) -> Self {
        self.email_address = Some(email_address.into());
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Includes tombstoned orders in the result.
    pub fn include_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if the order passes every predicate of this query.
    ///
    /// Paging is not a predicate and is applied by the store.
    pub fn matches(&self, order: &Order) -> bool {
        if !self.include_deleted && order.is_deleted() {
            return false;
        }
        if let Some(ref user_name) = self.user_name
            && order.user_name() != user_name
        {
            return false;
        }
        if let Some(ref email) = self.email_address
            && order.email_address() != email
        {
            return false;
        }
        if let Some(ref country) = self.country
            && order.country() != country
        {
            return false;
        }
        true
    }
}
