//! Engine state persisted next to the orders: the lifetime [`Counter`]
//! and each market's last clearance price.

use clearbook_types::constants::COUNTER_KEY;
use clearbook_types::{Counter, MarketId, Result, codec};
use rust_decimal::Decimal;

use crate::keys::clearance_key;
use crate::kv::KvStore;

/// Load the counter; a fresh store yields zeroed totals.
pub fn load_counter<S: KvStore>(kv: &S) -> Result<Counter> {
    match kv.get(COUNTER_KEY)? {
        Some(raw) => codec::decode(&raw),
        None => Ok(Counter::new()),
    }
}

pub fn save_counter<S: KvStore>(kv: &mut S, counter: &Counter) -> Result<()> {
    kv.set(COUNTER_KEY, codec::encode(counter)?)
}

/// Clearance price of the market's most recent crossed cycle.
pub fn load_last_clearance<S: KvStore>(kv: &S, market: MarketId) -> Result<Option<Decimal>> {
    kv.get(&clearance_key(market))?
        .map(|raw| codec::decode(&raw))
        .transpose()
}

pub fn save_last_clearance<S: KvStore>(kv: &mut S, market: MarketId, price: Decimal) -> Result<()> {
    kv.set(&clearance_key(market), codec::encode(&price)?)
}
