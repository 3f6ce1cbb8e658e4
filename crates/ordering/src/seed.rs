//! First-run population of the order collection.

use rust_decimal::Decimal;

use crate::order::Order;

/// Result of a seeding attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The collection was empty and this many orders were inserted.
    Seeded(usize),

    /// The collection already held orders; nothing was written.
    AlreadyPopulated,
}

/// Draft orders inserted into an empty collection at startup.
pub fn preconfigured_orders() -> Vec<Order> {
    vec![
        Order::builder()
            .user_name("David")
            .first_name("Mehmet")
            .last_name("Ozkaya")
            .email_address("test@gmail.com")
            .address_line("Bahcelievler")
            .country("Turkey")
            .total_price(Decimal::new(350, 0))
            .build(),
    ]
}
