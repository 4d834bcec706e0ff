//! Order types for the ClearBook engine.
//!
//! An [`Order`] is a resting limit order owned by the order store. The
//! engine copies orders out of the store for one cycle and writes the
//! reduced quantities back; nothing else holds on to them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{MarketId, OrderId, Owner};

/// Which side of the book this order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Direction {
    Bid,
    Ask,
}

impl Direction {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Bid => Self::Ask,
            Self::Ask => Self::Bid,
        }
    }

    /// Whether a limit at `limit_price` on this side accepts `clearance`.
    /// Bids buy at or below their limit, asks sell at or above it.
    #[must_use]
    pub fn accepts(self, limit_price: Decimal, clearance: Decimal) -> bool {
        match self {
            Self::Bid => limit_price >= clearance,
            Self::Ask => limit_price <= clearance,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bid => write!(f, "BID"),
            Self::Ask => write!(f, "ASK"),
        }
    }
}

/// A resting limit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub market_id: MarketId,
    pub owner: Owner,
    pub direction: Direction,
    /// Limit price.
    pub price: Decimal,
    /// Resting quantity, reduced in place by partial fills.
    pub quantity: Decimal,
    /// Host-supplied creation time (block time).
    pub created_at: DateTime<Utc>,
}

impl Order {
    #[must_use]
    pub fn new(
        id: OrderId,
        market_id: MarketId,
        owner: Owner,
        direction: Direction,
        price: Decimal,
        quantity: Decimal,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            market_id,
            owner,
            direction,
            price,
            quantity,
            created_at,
        }
    }

    /// A zero-quantity order is not resting and must leave the store.
    #[must_use]
    pub fn is_resting(&self) -> bool {
        self.quantity > Decimal::ZERO
    }

    #[must_use]
    pub fn is_matchable_at(&self, clearance: Decimal) -> bool {
        self.is_resting() && self.direction.accepts(self.price, clearance)
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order[{}] {} {} {} @ {} owner={}",
            self.id, self.market_id, self.direction, self.quantity, self.price, self.owner,
        )
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    /// Limit order with a fixed owner and the epoch timestamp.
    pub fn dummy(id: u64, market: u64, direction: Direction, price: Decimal, qty: Decimal) -> Self {
        Self::dummy_for_owner(id, market, Owner::new("wallet1dummy"), direction, price, qty)
    }

    pub fn dummy_for_owner(
        id: u64,
        market: u64,
        owner: Owner,
        direction: Direction,
        price: Decimal,
        qty: Decimal,
    ) -> Self {
        Self {
            id: OrderId(id),
            market_id: MarketId(market),
            owner,
            direction,
            price,
            quantity: qty,
            created_at: DateTime::<Utc>::default(),
        }
    }
}

/// Seeded random order generation for ordering / determinism tests.
#[cfg(feature = "test-helpers")]
impl Order {
    /// `count` orders with consecutive IDs starting at `first_id`, integer
    /// quantities in `1..=100` and integer prices in `90..=110`.
    pub fn random_batch<R: rand::Rng>(
        rng: &mut R,
        market: u64,
        first_id: u64,
        count: u64,
    ) -> Vec<Self> {
        (first_id..first_id + count)
            .map(|id| {
                let direction = if rng.gen_bool(0.5) {
                    Direction::Bid
                } else {
                    Direction::Ask
                };
                let owner = Owner::new(format!("wallet{}", rng.gen_range(0..8u32)));
                Self::dummy_for_owner(
                    id,
                    market,
                    owner,
                    direction,
                    Decimal::from(rng.gen_range(90..=110u32)),
                    Decimal::from(rng.gen_range(1..=100u32)),
                )
            })
            .collect()
    }
}
