//! A single step of a bid or ask curve.
//!
//! All orders at one price, kept in ascending order ID (time priority).

use clearbook_types::{ClearbookError, Order, OrderId, Result};
use rust_decimal::Decimal;

/// A single price level containing all orders at that price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceLevel {
    /// The price at this level.
    pub price: Decimal,
    /// Orders in ascending ID order.
    orders: Vec<Order>,
    /// Sum of resting quantity across `orders`.
    total: Decimal,
}

impl PriceLevel {
    /// Create a new empty price level.
    #[must_use]
    pub fn new(price: Decimal) -> Self {
        Self {
            price,
            orders: Vec::new(),
            total: Decimal::ZERO,
        }
    }

    /// Add an order, keeping ascending ID order.
    ///
    /// # Errors
    /// `InvariantViolation` if the price differs from the level's, the ID is
    /// already present, or the level volume overflows.
    pub fn insert(&mut self, order: Order) -> Result<()> {
        if order.price != self.price {
            return Err(ClearbookError::invariant(format!(
                "order {} at {} pushed into level {}",
                order.id, order.price, self.price
            )));
        }
        self.total = self.total.checked_add(order.quantity).ok_or_else(|| {
            ClearbookError::invariant(format!("level {} volume overflows", self.price))
        })?;

        // Store iteration already yields ascending IDs; this is the fast path.
        match self.orders.last() {
            Some(last) if last.id >= order.id => {
                let pos = self
                    .orders
                    .binary_search_by_key(&order.id, |o| o.id)
                    .err()
                    .ok_or_else(|| {
                        ClearbookError::invariant(format!("duplicate order {} in level", order.id))
                    })?;
                self.orders.insert(pos, order);
            }
            _ => self.orders.push(order),
        }
        Ok(())
    }

    /// Orders in ascending ID order.
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Total remaining quantity across all orders at this level.
    #[must_use]
    pub fn total_quantity(&self) -> Decimal {
        self.total
    }

    #[must_use]
    pub fn contains(&self, id: OrderId) -> bool {
        self.orders.binary_search_by_key(&id, |o| o.id).is_ok()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of orders at this level.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }
}
