//! Per-order outcome of a matching cycle.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Direction, Order, OrderId};

/// What happened to the order in the store after its fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FillState {
    /// Whole resting quantity matched; the order was deleted.
    FullyFilled,
    /// Quantity reduced; the remainder keeps resting.
    PartiallyFilled,
}

impl std::fmt::Display for FillState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FullyFilled => write!(f, "FULLY_FILLED"),
            Self::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
        }
    }
}

/// One order's fill within a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFill {
    /// The order as it rested before the cycle.
    pub order: Order,
    /// Price every fill of the cycle executes at.
    pub clearance_price: Decimal,
    pub quantity_filled: Decimal,
    pub quantity_unfilled: Decimal,
    pub state: FillState,
    /// Commission accrued on `quantity_filled * clearance_price`.
    pub commission: Decimal,
}

impl OrderFill {
    #[must_use]
    pub fn order_id(&self) -> OrderId {
        self.order.id
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.order.direction
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.state == FillState::FullyFilled
    }
}

impl std::fmt::Display for OrderFill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Fill[{}] {} {} filled={} unfilled={} @ {} commission={}",
            self.order.id,
            self.order.direction,
            self.state,
            self.quantity_filled,
            self.quantity_unfilled,
            self.clearance_price,
            self.commission,
        )
    }
}
