//! Clearance state and the per-cycle matcher result record.
//!
//! A [`MatcherResult`] is the immutable output of one market's cycle. It is
//! handed to downstream consumers (settlement, reporting) and is bit-for-bit
//! identical on every replica that ran the same cycle on the same store.

use std::fmt::Write as _;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CycleId, Direction, MarketId, OrderFill};

/// Where the bid and ask curves crossed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearanceState {
    /// Clearance price; `None` when the curves do not cross.
    pub price: Option<Decimal>,
    /// Fraction of the marginal level's volume that gets filled on the
    /// rationed side. `1` when the crossing lands on a step boundary.
    pub pro_rata: Decimal,
    /// `1 / pro_rata`, truncated. `1` when no rationing happened.
    pub pro_rata_invert: Decimal,
    /// Cumulative bid volume at prices `>= price`.
    pub max_bid_volume: Decimal,
    /// Cumulative ask volume at prices `<= price`.
    pub max_ask_volume: Decimal,
    /// Side whose marginal level is filled pro-rata.
    pub rationed: Option<Direction>,
}

impl ClearanceState {
    /// Sentinel for a cycle in which nothing crosses.
    #[must_use]
    pub fn no_crossing() -> Self {
        Self {
            price: None,
            pro_rata: Decimal::ONE,
            pro_rata_invert: Decimal::ONE,
            max_bid_volume: Decimal::ZERO,
            max_ask_volume: Decimal::ZERO,
            rationed: None,
        }
    }

    #[must_use]
    pub fn is_crossed(&self) -> bool {
        self.price.is_some()
    }

    /// Volume both sides can trade at the clearance price.
    #[must_use]
    pub fn matchable_volume(&self) -> Decimal {
        if self.price.is_none() {
            return Decimal::ZERO;
        }
        self.max_bid_volume.min(self.max_ask_volume)
    }
}

impl std::fmt::Display for ClearanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let price = self
            .price
            .map_or_else(|| "none".to_string(), |p| p.to_string());
        let rationed = self
            .rationed
            .map_or_else(|| "none".to_string(), |d| d.to_string());
        writeln!(f, "ClearanceState:")?;
        writeln!(f, "  Price:          {price}")?;
        writeln!(f, "  ProRata:        {}", self.pro_rata)?;
        writeln!(f, "  ProRataInvert:  {}", self.pro_rata_invert)?;
        writeln!(f, "  MaxBidVolume:   {}", self.max_bid_volume)?;
        writeln!(f, "  MaxAskVolume:   {}", self.max_ask_volume)?;
        writeln!(f, "  Rationed:       {rationed}")
    }
}

/// Outcome of one matching cycle for one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherResult {
    pub cycle_id: CycleId,
    pub market_id: MarketId,
    /// Active bid orders before the cycle.
    pub bid_orders_count: usize,
    /// Active ask orders before the cycle.
    pub ask_orders_count: usize,
    pub clearance_state: ClearanceState,
    /// Sum of filled bid quantity.
    pub matched_bid_volume: Decimal,
    /// Sum of filled ask quantity. Always equal to `matched_bid_volume`.
    pub matched_ask_volume: Decimal,
    /// Fills in processing order: bid levels best-first, then ask levels
    /// best-first, ascending order ID inside each level.
    pub order_fills: Vec<OrderFill>,
    /// SHA-256 commitment over the fills, for cross-replica comparison.
    pub fill_root: [u8; 32],
}

impl MatcherResult {
    #[must_use]
    pub fn fills_for(&self, direction: Direction) -> impl Iterator<Item = &OrderFill> {
        self.order_fills
            .iter()
            .filter(move |f| f.order.direction == direction)
    }

    /// Commission accrued by all fills of the cycle.
    #[must_use]
    pub fn total_commission(&self) -> Decimal {
        self.order_fills.iter().map(|f| f.commission).sum()
    }

    /// One-paragraph summary for logs.
    #[must_use]
    pub fn short_string(&self) -> String {
        let price = self
            .clearance_state
            .price
            .map_or_else(|| "none".to_string(), |p| p.to_string());
        let mut s = String::new();
        let _ = writeln!(s, "MatcherResult for {} ({}):", self.market_id, self.cycle_id);
        let _ = writeln!(
            s,
            "  Bid/Ask orders count:   {}/{}",
            self.bid_orders_count, self.ask_orders_count
        );
        let _ = writeln!(s, "  ClearanceState.Price:   {price}");
        let _ = writeln!(s, "  ClearanceState.ProRata: {}", self.clearance_state.pro_rata);
        let _ = write!(s, "  OrderFillsCount:        {}", self.order_fills.len());
        s
    }
}

impl std::fmt::Display for MatcherResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "MatcherResult:")?;
        writeln!(f, "  Cycle:            {}", self.cycle_id)?;
        writeln!(f, "  MarketID:         {}", self.market_id)?;
        writeln!(f, "  BidOrdersCount:   {}", self.bid_orders_count)?;
        writeln!(f, "  AskOrdersCount:   {}", self.ask_orders_count)?;
        writeln!(f, "  MatchedBidVolume: {}", self.matched_bid_volume)?;
        writeln!(f, "  MatchedAskVolume: {}", self.matched_ask_volume)?;
        write!(f, "{}", self.clearance_state)?;
        writeln!(f, "OrderFills:")?;
        for fill in &self.order_fills {
            writeln!(f, "  {fill}")?;
        }
        Ok(())
    }
}
