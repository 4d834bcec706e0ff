//! Store key layout.
//!
//! ```text
//! o/<order id: u64 BE>      -> Order
//! p/<market id: u64 BE>     -> last clearance price
//! c/counter                 -> Counter
//! ```

use clearbook_types::constants::{CLEARANCE_KEY_PREFIX, ORDER_KEY_PREFIX};
use clearbook_types::{MarketId, OrderId};

#[must_use]
pub fn order_key(id: OrderId) -> Vec<u8> {
    let mut key = Vec::with_capacity(ORDER_KEY_PREFIX.len() + 8);
    key.extend_from_slice(ORDER_KEY_PREFIX);
    key.extend_from_slice(&id.to_key_bytes());
    key
}

/// Recover the order ID from a full order key.
#[must_use]
pub fn order_id_from_key(key: &[u8]) -> Option<OrderId> {
    OrderId::from_key_bytes(key.strip_prefix(ORDER_KEY_PREFIX)?)
}

#[must_use]
pub fn clearance_key(market: MarketId) -> Vec<u8> {
    let mut key = Vec::with_capacity(CLEARANCE_KEY_PREFIX.len() + 8);
    key.extend_from_slice(CLEARANCE_KEY_PREFIX);
    key.extend_from_slice(&market.to_key_bytes());
    key
}

/// Smallest key strictly greater than every key starting with `prefix`.
/// `None` when no such key exists (empty or all-`0xFF` prefix).
#[must_use]
pub fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}
