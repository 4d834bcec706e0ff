//! Filter and pagination parameters for order listing.

use clearbook_types::{ClearbookError, Direction, MarketId, Order, Owner, Result, constants};

/// Conjunctive filter with 1-indexed pagination.
///
/// Unset filters are wildcards. `page = 1, limit = N` yields the first `N`
/// matches in ascending order ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdersFilter {
    pub owner: Option<Owner>,
    pub direction: Option<Direction>,
    pub market_id: Option<MarketId>,
    pub page: u64,
    pub limit: u64,
}

impl Default for OrdersFilter {
    fn default() -> Self {
        Self::new(1, constants::DEFAULT_PAGE_LIMIT)
    }
}

impl OrdersFilter {
    #[must_use]
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            owner: None,
            direction: None,
            market_id: None,
            page,
            limit,
        }
    }

    #[must_use]
    pub fn with_owner(mut self, owner: Owner) -> Self {
        self.owner = Some(owner);
        self
    }

    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    #[must_use]
    pub fn with_market(mut self, market_id: MarketId) -> Self {
        self.market_id = Some(market_id);
        self
    }

    /// Reject malformed pagination before the store is touched.
    pub fn validate(&self) -> Result<()> {
        if self.page < 1 {
            return Err(ClearbookError::invalid_argument("page must be >= 1"));
        }
        if self.limit < 1 {
            return Err(ClearbookError::invalid_argument("limit must be >= 1"));
        }
        Ok(())
    }

    /// Number of matches to skip before the requested page.
    ///
    /// Saturates: a page past any addressable offset is simply empty.
    pub fn offset(&self) -> Result<usize> {
        self.validate()?;
        let skip = (self.page - 1).saturating_mul(self.limit);
        Ok(usize::try_from(skip).unwrap_or(usize::MAX))
    }

    #[must_use]
    pub fn take(&self) -> usize {
        usize::try_from(self.limit).unwrap_or(usize::MAX)
    }

    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        self.owner.as_ref().is_none_or(|o| *o == order.owner)
            && self.direction.is_none_or(|d| d == order.direction)
            && self.market_id.is_none_or(|m| m == order.market_id)
    }
}
