//! Fill allocation and store mutation.
//!
//! [`plan_fills`] turns a [`Clearance`] into per-order fills without touching
//! the store; [`apply_fills`] then writes them. The plan is fully validated
//! first so a failed cycle never leaves a half-mutated store behind.
//!
//! Fill order: bid levels best-first, then ask levels best-first, ascending
//! order ID inside each level.

use clearbook_store::{KvStore, OrderStore};
use clearbook_types::format::{floor_to_scale, unit_at_scale};
use clearbook_types::{
    ClearbookError, CounterDelta, Direction, FillState, MarketConfig, Order, OrderFill, Result,
};
use rust_decimal::Decimal;

use crate::clearing::{Clearance, MarginalLevel};
use crate::curve::{Curve, MarketCurves};
use crate::price_level::PriceLevel;

/// Validated fills of one cycle, ready to be applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    pub fills: Vec<OrderFill>,
    pub matched_bid_volume: Decimal,
    pub matched_ask_volume: Decimal,
    /// Counter increments, absorbed by the engine only after success.
    pub delta: CounterDelta,
}

/// Compute every order's fill for `clearance`.
///
/// # Errors
/// `InvariantViolation` if a fill would exceed its order, the sides do not
/// balance, or arithmetic overflows.
pub fn plan_fills(
    curves: &MarketCurves,
    clearance: &Clearance,
    market: &MarketConfig,
) -> Result<Allocation> {
    let Some(price) = clearance.state.price else {
        return Ok(Allocation::default());
    };

    let mut allocation = Allocation::default();
    for side in [Direction::Bid, Direction::Ask] {
        let curve = curves.curve(side);
        let plan = clearance.side(side);
        let mut side_volume = Decimal::ZERO;

        for level in curve.levels().iter().take(plan.full_levels) {
            for order in level.orders() {
                let fill = make_fill(order, order.quantity, price, market)?;
                side_volume = checked_add(side_volume, fill.quantity_filled)?;
                allocation.fills.push(fill);
            }
        }

        if let Some(marginal) = &plan.marginal {
            let level = marginal_level(curve, marginal)?;
            let shares = pro_rata_shares(level, marginal, market.quantity_scale)?;
            for (order, share) in level.orders().iter().zip(shares) {
                if share.is_zero() {
                    continue;
                }
                let fill = make_fill(order, share, price, market)?;
                side_volume = checked_add(side_volume, fill.quantity_filled)?;
                allocation.fills.push(fill);
            }
        }

        match side {
            Direction::Bid => allocation.matched_bid_volume = side_volume,
            Direction::Ask => allocation.matched_ask_volume = side_volume,
        }
    }

    validate(&allocation, clearance)?;

    for fill in &allocation.fills {
        allocation.delta.record_fill(fill);
    }
    allocation
        .delta
        .record_matched_volume(allocation.matched_bid_volume);
    Ok(allocation)
}

/// Write a planned allocation: fully filled orders are deleted, partial ones
/// keep resting with the reduced quantity.
pub fn apply_fills<S: KvStore>(store: &mut OrderStore<S>, allocation: &Allocation) -> Result<()> {
    for fill in &allocation.fills {
        match fill.state {
            FillState::FullyFilled => store.delete(fill.order_id())?,
            FillState::PartiallyFilled => {
                let mut rest = fill.order.clone();
                rest.quantity = fill.quantity_unfilled;
                store.set(&rest)?;
            }
        }
        tracing::debug!(
            order_id = %fill.order_id(),
            direction = %fill.direction(),
            filled = %fill.quantity_filled,
            unfilled = %fill.quantity_unfilled,
            "fill applied"
        );
    }
    Ok(())
}

// =================================================================
// Pro-rata
// =================================================================

/// Split `marginal.volume` over the level's orders.
///
/// Each order first gets `floor(quantity * volume / level_volume)` at
/// `scale`. The rounding residual is then handed out in ascending order ID:
/// one unit per order, then whatever room is left. Both passes visit each
/// order once, so the work is bounded by the order count at any scale.
fn pro_rata_shares(level: &PriceLevel, marginal: &MarginalLevel, scale: u32) -> Result<Vec<Decimal>> {
    let mut shares = Vec::with_capacity(level.len());
    let mut assigned = Decimal::ZERO;
    for order in level.orders() {
        let exact = exact_share(order, marginal)?;
        let share = floor_to_scale(exact, scale).min(order.quantity);
        assigned = checked_add(assigned, share)?;
        shares.push(share);
    }

    let mut residual = marginal.volume - assigned;
    if residual < Decimal::ZERO {
        // Division rounding at the last digit can push a floor one unit over.
        for share in shares.iter_mut().rev() {
            let back = (*share).min(-residual);
            *share -= back;
            residual += back;
            if residual.is_zero() {
                break;
            }
        }
    }

    let unit = unit_at_scale(scale);
    for cap in [Some(unit), None] {
        for (share, order) in shares.iter_mut().zip(level.orders()) {
            if residual.is_zero() {
                break;
            }
            let room = order.quantity - *share;
            if room <= Decimal::ZERO {
                continue;
            }
            let extra = cap.map_or(room, |c| c.min(room)).min(residual);
            *share += extra;
            residual -= extra;
        }
    }

    if !residual.is_zero() {
        return Err(ClearbookError::invariant(format!(
            "residual {residual} left at level {}",
            level.price
        )));
    }
    Ok(shares)
}

/// `quantity * volume / level_volume` without the truncated pro-rata.
fn exact_share(order: &Order, marginal: &MarginalLevel) -> Result<Decimal> {
    order
        .quantity
        .checked_mul(marginal.volume)
        .and_then(|v| v.checked_div(marginal.level_volume))
        .or_else(|| {
            order
                .quantity
                .checked_div(marginal.level_volume)
                .and_then(|r| r.checked_mul(marginal.volume))
        })
        .ok_or_else(|| {
            ClearbookError::invariant(format!("pro-rata share of order {} overflows", order.id))
        })
}

// =================================================================
// Helpers
// =================================================================

fn marginal_level<'a>(curve: &'a Curve, marginal: &MarginalLevel) -> Result<&'a PriceLevel> {
    curve.levels().get(marginal.level).ok_or_else(|| {
        ClearbookError::invariant(format!(
            "{} marginal level {} out of range",
            curve.side(),
            marginal.level
        ))
    })
}

fn make_fill(order: &Order, filled: Decimal, price: Decimal, market: &MarketConfig) -> Result<OrderFill> {
    if filled <= Decimal::ZERO || filled > order.quantity {
        return Err(ClearbookError::invariant(format!(
            "fill {filled} out of range for order {} resting {}",
            order.id, order.quantity
        )));
    }
    if !order.is_matchable_at(price) {
        return Err(ClearbookError::invariant(format!(
            "order {} limit {} does not accept clearance {price}",
            order.id, order.price
        )));
    }

    let unfilled = order.quantity - filled;
    let commission = filled
        .checked_mul(price)
        .and_then(|quote| quote.checked_mul(market.commission_rate))
        .map(|c| floor_to_scale(c, market.quote_scale))
        .ok_or_else(|| {
            ClearbookError::invariant(format!("commission of order {} overflows", order.id))
        })?;

    Ok(OrderFill {
        order: order.clone(),
        clearance_price: price,
        quantity_filled: filled,
        quantity_unfilled: unfilled,
        state: if unfilled.is_zero() {
            FillState::FullyFilled
        } else {
            FillState::PartiallyFilled
        },
        commission,
    })
}

fn validate(allocation: &Allocation, clearance: &Clearance) -> Result<()> {
    if allocation.matched_bid_volume != allocation.matched_ask_volume {
        return Err(ClearbookError::invariant(format!(
            "matched bid volume {} != matched ask volume {}",
            allocation.matched_bid_volume, allocation.matched_ask_volume
        )));
    }
    if allocation.matched_bid_volume != clearance.matched_volume {
        return Err(ClearbookError::invariant(format!(
            "allocated {} but cleared {}",
            allocation.matched_bid_volume, clearance.matched_volume
        )));
    }
    Ok(())
}

fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| ClearbookError::invariant("matched volume overflows"))
}

#[cfg(test)]
mod tests {
    use clearbook_store::MemStore;
    use clearbook_types::{MarketId, OrderId};

    use super::*;
    use crate::clearing::compute_clearance;
    use crate::curve::build_curves;

    fn order(id: u64, direction: Direction, price: i64, qty: i64) -> Order {
        Order::dummy(id, 0, direction, Decimal::new(price, 0), Decimal::new(qty, 0))
    }

    fn market() -> MarketConfig {
        MarketConfig::new(MarketId(0), "BTC", "XFI").with_quantity_scale(0)
    }

    fn plan(orders: Vec<Order>, market: &MarketConfig) -> Allocation {
        let curves = build_curves(MarketId(0), orders).unwrap();
        let clearance = compute_clearance(&curves, None).unwrap();
        plan_fills(&curves, &clearance, market).unwrap()
    }

    fn filled(allocation: &Allocation) -> Vec<(u64, Decimal)> {
        allocation
            .fills
            .iter()
            .map(|f| (f.order_id().0, f.quantity_filled))
            .collect()
    }

    #[test]
    fn residual_goes_to_lowest_ids() {
        let allocation = plan(
            vec![
                order(0, Direction::Ask, 100, 50),
                order(1, Direction::Bid, 101, 60),
                order(2, Direction::Ask, 100, 30),
            ],
            &market(),
        );
        assert_eq!(
            filled(&allocation),
            vec![
                (1, Decimal::new(60, 0)),
                (0, Decimal::new(38, 0)),
                (2, Decimal::new(22, 0)),
            ]
        );
        assert_eq!(allocation.matched_bid_volume, Decimal::new(60, 0));
        assert_eq!(allocation.matched_ask_volume, Decimal::new(60, 0));
        assert_eq!(allocation.delta.full_fills, 1);
        assert_eq!(allocation.delta.partial_fills, 2);
    }

    #[test]
    fn fractional_shares_at_finer_scale() {
        let allocation = plan(
            vec![
                order(0, Direction::Ask, 100, 50),
                order(1, Direction::Bid, 101, 60),
                order(2, Direction::Ask, 100, 30),
            ],
            &MarketConfig::new(MarketId(0), "BTC", "XFI"),
        );
        let got = filled(&allocation);
        assert_eq!(
            got[1..],
            [(0, Decimal::new(375, 1)), (2, Decimal::new(225, 1))]
        );
    }

    #[test]
    fn tiny_orders_still_receive_residual() {
        // Three asks of 1 at 100, one bid of 2: pro-rata 2/3 floors to 0 each.
        let allocation = plan(
            vec![
                order(0, Direction::Ask, 100, 1),
                order(1, Direction::Ask, 100, 1),
                order(2, Direction::Ask, 100, 1),
                order(3, Direction::Bid, 100, 2),
            ],
            &market(),
        );
        assert_eq!(
            filled(&allocation),
            vec![(3, Decimal::TWO), (0, Decimal::ONE), (1, Decimal::ONE)]
        );
    }

    #[test]
    fn wide_ratio_at_max_scale_conserves_volume() {
        // 3e9 resting against 1e9 at 18 places: truncating 1/3 leaves a residual
        // of ~1e9 units that a unit-by-unit hand-out would never finish.
        let market = MarketConfig::new(MarketId(0), "BTC", "XFI").with_quantity_scale(18);
        let allocation = plan(
            vec![
                order(0, Direction::Ask, 100, 1_000_000_000),
                order(1, Direction::Ask, 100, 1_000_000_000),
                order(2, Direction::Ask, 100, 1_000_000_000),
                order(3, Direction::Bid, 100, 1_000_000_000),
            ],
            &market,
        );
        assert_eq!(allocation.matched_bid_volume, Decimal::new(1_000_000_000, 0));
        assert_eq!(allocation.matched_ask_volume, Decimal::new(1_000_000_000, 0));
        for fill in &allocation.fills {
            assert!(fill.quantity_filled <= fill.order.quantity);
        }
        let asks: Vec<Decimal> = allocation.fills[1..].iter().map(|f| f.quantity_filled).collect();
        let third = "333333333.333333333333333333".parse::<Decimal>().unwrap();
        assert_eq!(asks, vec![third + Decimal::new(1, 18), third, third]);
    }

    #[test]
    fn huge_level_against_dust_fills_lowest_id() {
        let price = Decimal::new(100, 0);
        let market = MarketConfig::new(MarketId(0), "BTC", "XFI");
        let allocation = plan(
            vec![
                Order::dummy(0, 0, Direction::Ask, price, Decimal::new(50_000_000_000, 0)),
                Order::dummy(1, 0, Direction::Ask, price, Decimal::new(50_000_000_000, 0)),
                Order::dummy(2, 0, Direction::Bid, price, Decimal::new(1, 8)),
            ],
            &market,
        );
        assert_eq!(
            filled(&allocation),
            vec![(2, Decimal::new(1, 8)), (0, Decimal::new(1, 8))]
        );
    }

    #[test]
    fn no_crossing_plans_nothing() {
        let allocation = plan(
            vec![order(0, Direction::Bid, 99, 5), order(1, Direction::Ask, 100, 5)],
            &market(),
        );
        assert_eq!(allocation, Allocation::default());
    }

    #[test]
    fn commission_is_floored_to_quote_scale() {
        let market = market()
            .with_commission_rate(Decimal::new(1, 3))
            .with_quote_scale(2);
        let allocation = plan(
            vec![order(0, Direction::Bid, 100, 7), order(1, Direction::Ask, 99, 7)],
            &market,
        );
        // Clears at 99: 7 * 99 * 0.001 = 0.693 -> 0.69
        for fill in &allocation.fills {
            assert_eq!(fill.commission, Decimal::new(69, 2));
        }
        assert_eq!(allocation.delta.commissions, 2);
        assert_eq!(allocation.delta.commissions_collected, Decimal::new(138, 2));
    }

    #[test]
    fn apply_deletes_full_and_reduces_partial() {
        let orders = vec![
            order(0, Direction::Ask, 100, 50),
            order(1, Direction::Bid, 101, 60),
            order(2, Direction::Ask, 100, 30),
        ];
        let mut store = OrderStore::new(MemStore::new());
        for o in &orders {
            store.set(o).unwrap();
        }

        let allocation = plan(orders, &market());
        apply_fills(&mut store, &allocation).unwrap();

        assert!(!store.has(OrderId(1)).unwrap());
        assert_eq!(store.get(OrderId(0)).unwrap().quantity, Decimal::new(12, 0));
        assert_eq!(store.get(OrderId(2)).unwrap().quantity, Decimal::new(8, 0));
    }

    #[test]
    fn out_of_range_fill_rejected() {
        let o = order(0, Direction::Bid, 100, 5);
        assert!(make_fill(&o, Decimal::new(6, 0), Decimal::new(100, 0), &market()).is_err());
        assert!(make_fill(&o, Decimal::ZERO, Decimal::new(100, 0), &market()).is_err());
        // A bid never fills above its limit.
        assert!(make_fill(&o, Decimal::ONE, Decimal::new(101, 0), &market()).is_err());
    }
}
