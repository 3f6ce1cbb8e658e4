//! Order aggregate root.

use chrono::{DateTime, Utc};
use common::OrderId;
use persistence::{AuditFields, Entity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A customer order.
///
/// A draft order has no identifier; the store assigns one on the first
/// successful commit. Audit fields are written only by commits, never by
/// callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: Option<OrderId>,
    user_name: String,
    first_name: String,
    last_name: String,
    email_address: String,
    address_line: String,
    country: String,

    /// Taken as submitted. No recomputation or currency conversion.
    total_price: Decimal,

    #[serde(flatten)]
    audit: AuditFields,
}

impl Order {
    /// Creates a builder for a draft order.
    pub fn builder() -> OrderBuilder {
        OrderBuilder::default()
    }

    pub fn id(&self) -> Option<OrderId> {
        self.id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email_address(&self) -> &str {
        &self.email_address
    }

    pub fn address_line(&self) -> &str {
        &self.address_line
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    pub fn audit(&self) -> &AuditFields {
        &self.audit
    }

    pub fn created_date(&self) -> Option<DateTime<Utc>> {
        self.audit.created_date()
    }

    pub fn created_by(&self) -> Option<&str> {
        self.audit.created_by()
    }

    pub fn last_modified_date(&self) -> Option<DateTime<Utc>> {
        self.audit.last_modified_date()
    }

    pub fn last_modified_by(&self) -> Option<&str> {
        self.audit.last_modified_by()
    }

    pub fn is_deleted(&self) -> bool {
        self.audit.is_deleted()
    }

    /// Returns true if this order has never been committed.
    pub fn is_draft(&self) -> bool {
        self.id.is_none()
    }

    pub fn set_name(&mut self, first_name: impl Into<String>, last_name: impl Into<String>) {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
    }

    pub fn set_email_address(&mut self, email_address: impl Into<String>) {
        self.email_address = email_address.into();
    }

    pub fn set_address(&mut self, address_line: impl Into<String>, country: impl Into<String>) {
        self.address_line = address_line.into();
        self.country = country.into();
    }

    pub fn set_total_price(&mut self, total_price: Decimal) {
        self.total_price = total_price;
    }

    #[cfg(test)]
    pub(crate) fn audit_fields_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }

    /// Rebuilds a persisted order from stored columns.
    pub(crate) fn restore(id: OrderId, draft: Order, audit: AuditFields) -> Self {
        Self {
            id: Some(id),
            audit,
            ..draft
        }
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn entity_type() -> &'static str {
        "Order"
    }

    fn id(&self) -> Option<OrderId> {
        self.id
    }

    fn audit(&self) -> Option<&AuditFields> {
        Some(&self.audit)
    }

    fn audit_mut(&mut self) -> Option<&mut AuditFields> {
        Some(&mut self.audit)
    }
}

/// Builder for draft orders.
#[derive(Debug, Default)]
pub struct OrderBuilder {
    user_name: String,
    first_name: String,
    last_name: String,
    email_address: String,
    address_line: String,
    country: String,
    total_price: Decimal,
}

impl OrderBuilder {
    pub fn user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = user_name.into();
        self
    }

    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self
    }

    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = last_name.into();
        self
    }

    pub fn email_address(mut self, email_address: impl Into<String>) -> Self {
        self.email_address = email_address.into();
        self
    }

    pub fn address_line(mut self, address_line: impl Into<String>) -> Self {
        self.address_line = address_line.into();
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn total_price(mut self, total_price: Decimal) -> Self {
        self.total_price = total_price;
        self
    }

    /// Builds a draft order with no identifier and empty audit fields.
    pub fn build(self) -> Order {
        Order {
            id: None,
            user_name: self.user_name,
            first_name: self.first_name,
            last_name: self.last_name,
            email_address: self.email_address,
            address_line: self.address_line,
            country: self.country,
            total_price: self.total_price,
            audit: AuditFields::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Order {
        Order::builder()
            .user_name("swn")
            .first_name("Mehmet")
            .last_name("Ozkaya")
            .email_address("ezozkme@gmail.com")
            .address_line("Bahcelievler")
            .country("Turkey")
            .total_price(Decimal::new(35050, 2))
            .build()
    }

    #[test]
    fn builder_produces_unstamped_draft() {
        let order = sample();
        assert!(order.is_draft());
        assert_eq!(order.id(), None);
        assert_eq!(order.user_name(), "swn");
        assert_eq!(order.total_price(), Decimal::new(35050, 2));
        assert_eq!(order.created_date(), None);
        assert_eq!(order.last_modified_by(), None);
        assert!(!order.is_deleted());
    }

    #[test]
    fn restore_keeps_details_and_sets_identity() {
        let audit = AuditFields::restore(Some(Utc::now()), Some("swn".into()), None, None, false);
        let order = Order::restore(OrderId::new(4), sample(), audit.clone());

        assert_eq!(order.id(), Some(OrderId::new(4)));
        assert_eq!(order.country(), "Turkey");
        assert_eq!(order.audit(), &audit);
    }

    #[test]
    fn setters_change_buyer_details_only() {
        let mut order = sample();
        order.set_address("Kadikoy", "Turkey");
        order.set_total_price(Decimal::new(400, 0));

        assert_eq!(order.address_line(), "Kadikoy");
        assert_eq!(order.total_price(), Decimal::new(400, 0));
        assert_eq!(order.first_name(), "Mehmet");
        assert!(order.is_draft());
    }

    #[test]
    fn serializes_audit_fields_inline() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["user_name"], "swn");
        assert!(json.get("created_by").is_some());
        assert!(json.get("audit").is_none());
    }
}
