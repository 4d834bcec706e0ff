//! Determinism verification utilities for cross-replica consistency.
//!
//! Every replica running the same cycle on the same store must produce the
//! exact same `MatcherResult`. The `fill_root` is a SHA-256 hash over the
//! fills that lets replicas compare results without shipping payloads.

use clearbook_types::{CycleId, Direction, MarketId, MatcherResult, OrderFill};
use sha2::{Digest, Sha256};

/// Compute the fill root over a cycle's fills.
///
/// Depends on the cycle, the market and, per fill in order: order ID,
/// direction, filled and unfilled quantity, clearance price and commission.
#[must_use]
pub fn compute_fill_root(cycle: CycleId, market: MarketId, fills: &[OrderFill]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"clearbook:fill_root:v1:");
    hasher.update(cycle.0.to_be_bytes());
    hasher.update(market.0.to_be_bytes());
    hasher.update((fills.len() as u64).to_be_bytes());

    for fill in fills {
        hasher.update(fill.order.id.to_key_bytes());
        hasher.update([match fill.order.direction {
            Direction::Bid => 0u8,
            Direction::Ask => 1u8,
        }]);
        // Length-delimit the decimal strings so adjacent fields cannot alias.
        for value in [
            fill.quantity_filled,
            fill.quantity_unfilled,
            fill.clearance_price,
            fill.commission,
        ] {
            let text = value.normalize().to_string();
            hasher.update((text.len() as u64).to_be_bytes());
            hasher.update(text.as_bytes());
        }
    }

    let result = hasher.finalize();
    let mut root = [0u8; 32];
    root.copy_from_slice(&result);
    root
}

/// Recompute the root of `result` and compare with the one it carries.
#[must_use]
pub fn verify_fill_root(result: &MatcherResult) -> bool {
    compute_fill_root(result.cycle_id, result.market_id, &result.order_fills) == result.fill_root
}

/// Hex rendering for logs.
#[must_use]
pub fn fill_root_hex(root: &[u8; 32]) -> String {
    hex::encode(root)
}
