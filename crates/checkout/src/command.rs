//! The checkout request.

use ordering::Order;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Buyer and shipping details submitted at checkout.
///
/// Fields map one-to-one onto a draft [`Order`]. The total price is taken
/// as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutOrder {
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub address_line: String,
    pub country: String,
    pub total_price: Decimal,
}

impl From<CheckoutOrder> for Order {
    fn from(request: CheckoutOrder) -> Self {
        Order::builder()
            .user_name(request.user_name)
            .first_name(request.first_name)
            .last_name(request.last_name)
            .email_address(request.email_address)
            .address_line(request.address_line)
            .country(request.country)
            .total_price(request.total_price)
            .build()
    }
}
