//! Clearance price computation for batch auctions.
//!
//! Given the bid and ask curves of one market, finds the uniform price at
//! which the most volume trades and decides how that volume is split
//! across levels.
//!
//! Candidate prices are the distinct level prices of both sides. For each
//! candidate `p`:
//!
//! ```text
//! D(p) = sum of bid levels with price >= p
//! S(p) = sum of ask levels with price <= p
//! matched(p) = min(D(p), S(p))
//! ```
//!
//! The chosen price maximizes `matched`. Ties go to the candidate closest to
//! the market's previous clearance price, then to the lower price.
//!
//! The clearing price algorithm is deterministic: same inputs -> same price.

use clearbook_types::constants::PRO_RATA_PRECISION;
use clearbook_types::format::floor_to_scale;
use clearbook_types::{ClearanceState, ClearbookError, Direction, Result};
use rust_decimal::Decimal;

use crate::curve::{Curve, MarketCurves};

/// The level on the rationed side that is filled pro-rata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarginalLevel {
    /// Index into the side's levels (priority order).
    pub level: usize,
    /// Volume to spread over the level's orders.
    pub volume: Decimal,
    /// Resting volume of the whole level.
    pub level_volume: Decimal,
    /// `volume / level_volume`, truncated to [`PRO_RATA_PRECISION`]. May be
    /// zero when the level dwarfs `volume`.
    pub pro_rata: Decimal,
    /// `level_volume / volume`, truncated; `Decimal::MAX` if unrepresentable.
    pub pro_rata_invert: Decimal,
}

/// How much of one side trades.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideAllocation {
    /// Leading levels (priority order) that fill completely.
    pub full_levels: usize,
    pub marginal: Option<MarginalLevel>,
}

/// Outcome of the solver for one market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clearance {
    pub state: ClearanceState,
    /// Volume each side trades.
    pub matched_volume: Decimal,
    pub bids: SideAllocation,
    pub asks: SideAllocation,
}

impl Clearance {
    fn none() -> Self {
        Self {
            state: ClearanceState::no_crossing(),
            matched_volume: Decimal::ZERO,
            bids: SideAllocation::default(),
            asks: SideAllocation::default(),
        }
    }

    #[must_use]
    pub fn side(&self, direction: Direction) -> &SideAllocation {
        match direction {
            Direction::Bid => &self.bids,
            Direction::Ask => &self.asks,
        }
    }
}

/// A candidate price with its curve volumes.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    price: Decimal,
    demand: Decimal,
    supply: Decimal,
    matched: Decimal,
}

/// Compute the clearance for one market.
///
/// `previous` is the market's last clearance price, used only to break ties
/// between candidates that trade the same volume.
///
/// # Errors
/// `InvariantViolation` if curve sums overflow or the rationing walk does
/// not reach the matched volume.
pub fn compute_clearance(curves: &MarketCurves, previous: Option<Decimal>) -> Result<Clearance> {
    if !curves.can_cross() {
        tracing::debug!(market = %curves.market, "curves do not cross");
        return Ok(Clearance::none());
    }

    let mut best: Option<Candidate> = None;
    for price in curves.candidate_prices() {
        let demand = curves.bids.volume_at(price)?;
        let supply = curves.asks.volume_at(price)?;
        let candidate = Candidate {
            price,
            demand,
            supply,
            matched: demand.min(supply),
        };
        if candidate.matched.is_zero() {
            continue;
        }
        best = match best {
            Some(current) if !beats(&candidate, &current, previous) => Some(current),
            _ => Some(candidate),
        };
    }

    let Some(chosen) = best else {
        return Ok(Clearance::none());
    };

    let (state, bids, asks) = if chosen.demand == chosen.supply {
        let state = ClearanceState {
            price: Some(chosen.price),
            pro_rata: Decimal::ONE,
            pro_rata_invert: Decimal::ONE,
            max_bid_volume: chosen.demand,
            max_ask_volume: chosen.supply,
            rationed: None,
        };
        (
            state,
            unrationed(&curves.bids, chosen.price),
            unrationed(&curves.asks, chosen.price),
        )
    } else {
        let rationed_side = if chosen.demand > chosen.supply {
            Direction::Bid
        } else {
            Direction::Ask
        };
        let rationed = ration(curves.curve(rationed_side), chosen.price, chosen.matched)?;
        let other = unrationed(curves.curve(rationed_side.opposite()), chosen.price);

        let (pro_rata, pro_rata_invert, rationed_dir) = match &rationed.marginal {
            Some(m) => (m.pro_rata, m.pro_rata_invert, Some(rationed_side)),
            // The matched volume lands exactly on a level boundary.
            None => (Decimal::ONE, Decimal::ONE, None),
        };
        let state = ClearanceState {
            price: Some(chosen.price),
            pro_rata,
            pro_rata_invert,
            max_bid_volume: chosen.demand,
            max_ask_volume: chosen.supply,
            rationed: rationed_dir,
        };
        match rationed_side {
            Direction::Bid => (state, rationed, other),
            Direction::Ask => (state, other, rationed),
        }
    };

    tracing::debug!(
        market = %curves.market,
        price = %chosen.price,
        demand = %chosen.demand,
        supply = %chosen.supply,
        pro_rata = %state.pro_rata,
        "clearance computed"
    );

    Ok(Clearance {
        state,
        matched_volume: chosen.matched,
        bids,
        asks,
    })
}

/// `true` if `candidate` should replace `current`.
fn beats(candidate: &Candidate, current: &Candidate, previous: Option<Decimal>) -> bool {
    if candidate.matched != current.matched {
        return candidate.matched > current.matched;
    }
    if let Some(prev) = previous {
        let d_candidate = (candidate.price - prev).abs();
        let d_current = (current.price - prev).abs();
        if d_candidate != d_current {
            return d_candidate < d_current;
        }
    }
    candidate.price < current.price
}

/// Every eligible level of the short side fills completely.
fn unrationed(curve: &Curve, price: Decimal) -> SideAllocation {
    SideAllocation {
        full_levels: curve.eligible_levels(price).count(),
        marginal: None,
    }
}

/// Walk the long side in priority order until `matched` is used up.
fn ration(curve: &Curve, price: Decimal, matched: Decimal) -> Result<SideAllocation> {
    let mut cumulative = Decimal::ZERO;
    for (index, level) in curve.eligible_levels(price).enumerate() {
        if cumulative == matched {
            return Ok(SideAllocation {
                full_levels: index,
                marginal: None,
            });
        }
        let level_total = level.total_quantity();
        let after = cumulative
            .checked_add(level_total)
            .ok_or_else(|| ClearbookError::invariant("rationing walk overflows"))?;
        if after > matched {
            let volume = matched - cumulative;
            let ratio = volume
                .checked_div(level_total)
                .ok_or_else(|| ClearbookError::invariant("empty marginal level"))?;
            let pro_rata_invert = level_total
                .checked_div(volume)
                .map_or(Decimal::MAX, |v| floor_to_scale(v, PRO_RATA_PRECISION));
            return Ok(SideAllocation {
                full_levels: index,
                marginal: Some(MarginalLevel {
                    level: index,
                    volume,
                    level_volume: level_total,
                    pro_rata: floor_to_scale(ratio, PRO_RATA_PRECISION),
                    pro_rata_invert,
                }),
            });
        }
        cumulative = after;
    }

    if cumulative == matched {
        return Ok(SideAllocation {
            full_levels: curve.eligible_levels(price).count(),
            marginal: None,
        });
    }
    Err(ClearbookError::invariant(format!(
        "{} curve holds {cumulative} at {price}, below matched volume {matched}",
        curve.side()
    )))
}
