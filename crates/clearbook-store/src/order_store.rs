//! The order store: the single owner of resting orders.
//!
//! Orders live under `o/<id BE>` in the host store, so the host's
//! lexicographic key order is ascending order ID. Every listing and
//! iteration derives its order from that, never from hash-map order.

use clearbook_types::constants::ORDER_KEY_PREFIX;
use clearbook_types::{ClearbookError, MarketId, Order, OrderId, Result, codec};
use rust_decimal::Decimal;

use crate::filter::OrdersFilter;
use crate::keys::{order_id_from_key, order_key};
use crate::kv::{KvIter, KvStore, Traversal};

/// Ordered, keyed collection of orders on top of a [`KvStore`].
#[derive(Debug, Clone, Default)]
pub struct OrderStore<S> {
    kv: S,
}

impl<S: KvStore> OrderStore<S> {
    #[must_use]
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// Underlying host store (engine state lives next to the orders).
    pub fn backend(&self) -> &S {
        &self.kv
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.kv
    }

    // =================================================================
    // Point access
    // =================================================================

    /// Fetch an order by ID.
    ///
    /// # Errors
    /// [`ClearbookError::OrderNotFound`] if no order has this ID.
    pub fn get(&self, id: OrderId) -> Result<Order> {
        let raw = self
            .kv
            .get(&order_key(id))?
            .ok_or(ClearbookError::OrderNotFound(id))?;
        codec::decode(&raw)
    }

    pub fn has(&self, id: OrderId) -> Result<bool> {
        self.kv.has(&order_key(id))
    }

    /// Insert or overwrite by ID.
    ///
    /// # Errors
    /// [`ClearbookError::InvariantViolation`] for a negative quantity.
    pub fn set(&mut self, order: &Order) -> Result<()> {
        if order.quantity < Decimal::ZERO {
            return Err(ClearbookError::invariant(format!(
                "order {} has negative quantity {}",
                order.id, order.quantity
            )));
        }
        let value = codec::encode(order)?;
        self.kv.set(&order_key(order.id), value)
    }

    /// Remove an order. Removing an absent ID is a no-op.
    pub fn delete(&mut self, id: OrderId) -> Result<()> {
        tracing::trace!(order_id = %id, "order deleted");
        self.kv.delete(&order_key(id))
    }

    // =================================================================
    // Iteration
    // =================================================================

    /// Lazy, single-pass traversal over ascending-ID key order.
    pub fn iter(&self, traversal: Traversal) -> Result<OrderIter<'_>> {
        Ok(OrderIter {
            inner: self.kv.iter_prefix(ORDER_KEY_PREFIX, traversal)?,
        })
    }

    /// Full snapshot in ascending ID order.
    pub fn list(&self) -> Result<Vec<Order>> {
        self.iter(Traversal::Forward)?.collect()
    }

    /// Filtered, paginated listing in ascending ID order.
    ///
    /// # Errors
    /// [`ClearbookError::InvalidArgument`] if `page < 1` or `limit < 1`;
    /// checked before the store is read.
    pub fn list_filtered(&self, filter: &OrdersFilter) -> Result<Vec<Order>> {
        let skip = filter.offset()?;
        let take = filter.take();

        let mut out = Vec::new();
        let mut skipped = 0usize;
        for order in self.iter(Traversal::Forward)? {
            let order = order?;
            if !filter.matches(&order) {
                continue;
            }
            if skipped < skip {
                skipped += 1;
                continue;
            }
            out.push(order);
            if out.len() == take {
                break;
            }
        }
        tracing::debug!(
            page = filter.page,
            limit = filter.limit,
            returned = out.len(),
            "filtered order listing"
        );
        Ok(out)
    }

    /// All orders of one market in ascending ID order, unpaginated.
    pub fn market_orders(&self, market: MarketId) -> Result<Vec<Order>> {
        let mut out = Vec::new();
        for order in self.iter(Traversal::Forward)? {
            let order = order?;
            if order.market_id == market {
                out.push(order);
            }
        }
        Ok(out)
    }
}

/// Cursor over stored orders. Dropping it releases the host cursor.
pub struct OrderIter<'a> {
    inner: KvIter<'a>,
}

impl Iterator for OrderIter<'_> {
    type Item = Result<Order>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next()?;
        Some(entry.and_then(|(key, value)| decode_entry(&key, &value)))
    }
}

fn decode_entry(key: &[u8], value: &[u8]) -> Result<Order> {
    let id = order_id_from_key(key).ok_or_else(|| {
        ClearbookError::invariant(format!("malformed order key {key:?}"))
    })?;
    let order: Order = codec::decode(value)?;
    if order.id != id {
        return Err(ClearbookError::invariant(format!(
            "order stored under key {id} carries id {}",
            order.id
        )));
    }
    Ok(order)
}
