//! Bid and ask curves for a single market.
//!
//! Uses `BTreeMap` for price-level ordering while building:
//! - **Bids**: `BTreeMap<Reverse<Decimal>, PriceLevel>` -- highest price first
//! - **Asks**: `BTreeMap<Decimal, PriceLevel>` -- lowest price first
//!
//! The finished [`Curve`] is a flat list of levels in priority order, which
//! is what the solver and the allocator index into.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use clearbook_types::{ClearbookError, Direction, MarketId, Order, Result};
use rust_decimal::Decimal;

use crate::price_level::PriceLevel;

/// One side of the book as a step function over price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Curve {
    side: Direction,
    /// Priority order: bids descending, asks ascending.
    levels: Vec<PriceLevel>,
}

impl Curve {
    #[must_use]
    pub fn side(&self) -> Direction {
        self.side
    }

    /// Levels in priority order.
    #[must_use]
    pub fn levels(&self) -> &[PriceLevel] {
        &self.levels
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Best price on this side (highest bid, lowest ask).
    #[must_use]
    pub fn best_price(&self) -> Option<Decimal> {
        self.levels.first().map(|l| l.price)
    }

    /// Number of orders across all levels.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.levels.iter().map(PriceLevel::len).sum()
    }

    /// Cumulative volume willing to trade at `price`.
    ///
    /// Bids: sum over levels with price `>= price`. Asks: sum over levels
    /// with price `<= price`.
    pub fn volume_at(&self, price: Decimal) -> Result<Decimal> {
        let mut total = Decimal::ZERO;
        for level in self.eligible_levels(price) {
            total = total
                .checked_add(level.total_quantity())
                .ok_or_else(|| ClearbookError::invariant("curve volume overflows"))?;
        }
        Ok(total)
    }

    /// Levels (in priority order) whose orders accept `price`.
    pub fn eligible_levels(&self, price: Decimal) -> impl Iterator<Item = &PriceLevel> {
        let side = self.side;
        self.levels
            .iter()
            .take_while(move |level| side.accepts(level.price, price))
    }
}

/// Both curves of one market, built from a store snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketCurves {
    pub market: MarketId,
    pub bids: Curve,
    pub asks: Curve,
}

impl MarketCurves {
    /// Candidate clearance prices: every distinct level price of either side,
    /// ascending.
    #[must_use]
    pub fn candidate_prices(&self) -> Vec<Decimal> {
        let mut prices: Vec<Decimal> = self
            .bids
            .levels
            .iter()
            .chain(&self.asks.levels)
            .map(|l| l.price)
            .collect();
        prices.sort_unstable();
        prices.dedup();
        prices
    }

    /// `true` if the best bid reaches the best ask.
    #[must_use]
    pub fn can_cross(&self) -> bool {
        matches!(
            (self.bids.best_price(), self.asks.best_price()),
            (Some(bid), Some(ask)) if bid >= ask
        )
    }

    #[must_use]
    pub fn curve(&self, side: Direction) -> &Curve {
        match side {
            Direction::Bid => &self.bids,
            Direction::Ask => &self.asks,
        }
    }
}

/// Build both curves for `market` from orders in ascending ID order.
///
/// Orders of other markets and orders with no resting quantity are skipped.
///
/// # Errors
/// `InvariantViolation` on a duplicate order ID or a level volume overflow.
pub fn build_curves(market: MarketId, orders: impl IntoIterator<Item = Order>) -> Result<MarketCurves> {
    let mut bids: BTreeMap<Reverse<Decimal>, PriceLevel> = BTreeMap::new();
    let mut asks: BTreeMap<Decimal, PriceLevel> = BTreeMap::new();

    for order in orders {
        if order.market_id != market {
            tracing::debug!(order_id = %order.id, market = %order.market_id, "foreign market order skipped");
            continue;
        }
        if !order.is_resting() {
            tracing::warn!(
                order_id = %order.id,
                quantity = %order.quantity,
                "order without resting quantity skipped"
            );
            continue;
        }

        let price = order.price;
        match order.direction {
            Direction::Bid => bids
                .entry(Reverse(price))
                .or_insert_with(|| PriceLevel::new(price))
                .insert(order)?,
            Direction::Ask => asks
                .entry(price)
                .or_insert_with(|| PriceLevel::new(price))
                .insert(order)?,
        }
    }

    Ok(MarketCurves {
        market,
        bids: Curve {
            side: Direction::Bid,
            levels: bids.into_values().collect(),
        },
        asks: Curve {
            side: Direction::Ask,
            levels: asks.into_values().collect(),
        },
    })
}
