//! Builds the immutable [`MatcherResult`] for a finished cycle.

use clearbook_types::{CycleId, MatcherResult};

use crate::allocator::Allocation;
use crate::clearing::Clearance;
use crate::curve::MarketCurves;
use crate::determinism::compute_fill_root;

/// Assemble the cycle record. Order counts come from the pre-cycle curves.
#[must_use]
pub fn assemble_result(
    cycle: CycleId,
    curves: &MarketCurves,
    clearance: Clearance,
    allocation: Allocation,
) -> MatcherResult {
    let fill_root = compute_fill_root(cycle, curves.market, &allocation.fills);
    MatcherResult {
        cycle_id: cycle,
        market_id: curves.market,
        bid_orders_count: curves.bids.order_count(),
        ask_orders_count: curves.asks.order_count(),
        clearance_state: clearance.state,
        matched_bid_volume: allocation.matched_bid_volume,
        matched_ask_volume: allocation.matched_ask_volume,
        order_fills: allocation.fills,
        fill_root,
    }
}

#[cfg(test)]
mod tests {
    use clearbook_types::{Direction, MarketConfig, MarketId, Order};
    use rust_decimal::Decimal;

    use super::*;
    use crate::allocator::plan_fills;
    use crate::clearing::compute_clearance;
    use crate::curve::build_curves;
    use crate::determinism::verify_fill_root;

    #[test]
    fn counts_and_root() {
        let orders = vec![
            Order::dummy(0, 3, Direction::Bid, Decimal::new(100, 0), Decimal::ONE),
            Order::dummy(1, 3, Direction::Bid, Decimal::new(90, 0), Decimal::ONE),
            Order::dummy(2, 3, Direction::Ask, Decimal::new(95, 0), Decimal::ONE),
        ];
        let curves = build_curves(MarketId(3), orders).unwrap();
        let clearance = compute_clearance(&curves, None).unwrap();
        let allocation =
            plan_fills(&curves, &clearance, &MarketConfig::new(MarketId(3), "A", "B")).unwrap();

        let result = assemble_result(CycleId(9), &curves, clearance, allocation);
        assert_eq!(result.market_id, MarketId(3));
        assert_eq!(result.cycle_id, CycleId(9));
        assert_eq!(result.bid_orders_count, 2);
        assert_eq!(result.ask_orders_count, 1);
        assert_eq!(result.order_fills.len(), 2);
        assert_eq!(result.matched_bid_volume, Decimal::ONE);
        assert!(verify_fill_root(&result));
    }
}
