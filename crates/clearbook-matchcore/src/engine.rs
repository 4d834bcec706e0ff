//! The matching engine for the ClearBook batch auction.
//!
//! A [`MatchingEngine`] owns the market configuration and the lifetime
//! [`Counter`]. Each call to [`MatchingEngine::run_cycle`] runs one market:
//!
//! 1. Snapshot the market's resting orders from the store
//! 2. Build bid/ask curves
//! 3. Solve the clearance price
//! 4. Plan and validate fills
//! 5. Apply fills to the store
//! 6. Assemble the [`MatcherResult`] and persist counter and last price
//!
//! # Determinism Contract
//!
//! Given the same store contents and the same cycle ID, every replica
//! produces the same store mutations and the same `fill_root`.
//!
//! A failed cycle leaves the in-memory counter untouched. Store writes only
//! begin once the plan has passed validation.

use clearbook_store::{KvStore, OrderStore, OrdersFilter, state};
use clearbook_types::*;
use rust_decimal::Decimal;

use crate::allocator::{apply_fills, plan_fills};
use crate::assembler::assemble_result;
use crate::clearing::compute_clearance;
use crate::curve::build_curves;
use crate::determinism::fill_root_hex;

/// Runs matching cycles over a set of configured markets.
#[derive(Debug, Clone)]
pub struct MatchingEngine {
    config: EngineConfig,
    counter: Counter,
}

impl MatchingEngine {
    /// Create an engine with zeroed totals.
    ///
    /// # Errors
    /// `Configuration` if the config fails validation.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            counter: Counter::new(),
        })
    }

    /// Create an engine and restore the lifetime counter from the store.
    pub fn load<S: KvStore>(config: EngineConfig, store: &OrderStore<S>) -> Result<Self> {
        let mut engine = Self::new(config)?;
        engine.counter = state::load_counter(store.backend())?;
        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            markets = engine.config.markets.len(),
            cycles = engine.counter.cycles,
            fills = engine.counter.fills,
            "engine state loaded"
        );
        tracing::debug!("{}", engine.counter.summary(constants::QUOTE_PRECISION));
        Ok(engine)
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn counter(&self) -> &Counter {
        &self.counter
    }

    /// First-page filter sized by the configured default page limit.
    #[must_use]
    pub fn default_filter(&self) -> OrdersFilter {
        OrdersFilter::new(1, self.config.default_page_limit)
    }

    /// Run one matching cycle for `market_id`.
    ///
    /// # Errors
    /// `InvalidArgument` for an unconfigured market; storage, codec and
    /// invariant errors abort the cycle and are returned as-is.
    pub fn run_cycle<S: KvStore>(
        &mut self,
        store: &mut OrderStore<S>,
        market_id: MarketId,
        cycle_id: CycleId,
    ) -> Result<MatcherResult> {
        let market = self
            .config
            .market(market_id)
            .ok_or_else(|| {
                ClearbookError::invalid_argument(format!("{market_id} is not configured"))
            })?
            .clone();

        match self.execute(store, &market, cycle_id) {
            Ok(result) => Ok(result),
            Err(err) => {
                tracing::warn!(
                    market = %market_id,
                    cycle = %cycle_id,
                    error = %err,
                    fatal = err.is_fatal(),
                    "matching cycle aborted"
                );
                Err(err)
            }
        }
    }

    /// Run one cycle for every configured market in ascending market ID.
    ///
    /// Stops at the first failing market; markets before it keep their
    /// committed results.
    pub fn run_all<S: KvStore>(
        &mut self,
        store: &mut OrderStore<S>,
        cycle_id: CycleId,
    ) -> Result<Vec<MatcherResult>> {
        let mut results = Vec::with_capacity(self.config.markets.len());
        for market_id in self.config.market_ids() {
            results.push(self.run_cycle(store, market_id, cycle_id)?);
        }
        Ok(results)
    }

    fn execute<S: KvStore>(
        &mut self,
        store: &mut OrderStore<S>,
        market: &MarketConfig,
        cycle_id: CycleId,
    ) -> Result<MatcherResult> {
        let previous = state::load_last_clearance(store.backend(), market.id)?;
        let orders = store.market_orders(market.id)?;

        let curves = build_curves(market.id, orders)?;
        let clearance = compute_clearance(&curves, previous)?;
        let allocation = plan_fills(&curves, &clearance, market)?;

        let mut next = self.counter.clone();
        next.absorb(&allocation.delta);

        apply_fills(store, &allocation)?;
        if let Some(price) = clearance.state.price {
            state::save_last_clearance(store.backend_mut(), market.id, price)?;
        }
        state::save_counter(store.backend_mut(), &next)?;
        self.counter = next;

        let result = assemble_result(cycle_id, &curves, clearance, allocation);
        log_result(market, &result);
        Ok(result)
    }
}

fn log_result(market: &MarketConfig, result: &MatcherResult) {
    let price = result
        .clearance_state
        .price
        .map_or_else(|| "none".to_string(), |p: Decimal| p.to_string());
    tracing::info!(
        market = %market.symbol(),
        cycle = %result.cycle_id,
        bids = result.bid_orders_count,
        asks = result.ask_orders_count,
        clearance_price = %price,
        pro_rata = %result.clearance_state.pro_rata,
        fills = result.order_fills.len(),
        matched = %result.matched_bid_volume,
        fill_root = %fill_root_hex(&result.fill_root),
        "matching cycle complete"
    );
    tracing::debug!("{}", result.short_string());
}

#[cfg(test)]
mod tests {
    use clearbook_store::MemStore;

    use super::*;

    fn config() -> EngineConfig {
        EngineConfig::new(vec![
            MarketConfig::btc_xfi(MarketId(0)).with_quantity_scale(0),
            MarketConfig::eth_xfi(MarketId(1)).with_quantity_scale(0),
        ])
    }

    fn store_with(orders: &[Order]) -> OrderStore<MemStore> {
        let mut store = OrderStore::new(MemStore::new());
        for order in orders {
            store.set(order).unwrap();
        }
        store
    }

    #[test]
    fn rejects_invalid_config() {
        assert!(matches!(
            MatchingEngine::new(EngineConfig::new(vec![])),
            Err(ClearbookError::Configuration(_))
        ));
    }

    #[test]
    fn unknown_market_rejected() {
        let mut engine = MatchingEngine::new(config()).unwrap();
        let mut store = store_with(&[]);
        assert!(matches!(
            engine.run_cycle(&mut store, MarketId(7), CycleId(1)),
            Err(ClearbookError::InvalidArgument { .. })
        ));
        assert_eq!(engine.counter().cycles, 0);
    }

    #[test]
    fn empty_cycle_counts_but_fills_nothing() {
        let mut engine = MatchingEngine::new(config()).unwrap();
        let mut store = store_with(&[]);
        let result = engine.run_cycle(&mut store, MarketId(0), CycleId(1)).unwrap();
        assert!(!result.clearance_state.is_crossed());
        assert!(result.order_fills.is_empty());
        assert_eq!(engine.counter().cycles, 1);
        assert_eq!(engine.counter().fills, 0);
    }

    #[test]
    fn default_filter_uses_configured_limit() {
        let mut cfg = config();
        cfg.default_page_limit = 5;
        let engine = MatchingEngine::new(cfg).unwrap();
        assert_eq!(engine.default_filter().take(), 5);
    }

    #[test]
    fn crossed_cycle_records_price_and_counter() {
        let orders = [
            Order::dummy(0, 0, Direction::Bid, Decimal::new(100, 0), Decimal::new(4, 0)),
            Order::dummy(1, 0, Direction::Ask, Decimal::new(100, 0), Decimal::new(4, 0)),
        ];
        let mut store = store_with(&orders);
        let mut engine = MatchingEngine::new(config()).unwrap();
        engine.run_cycle(&mut store, MarketId(0), CycleId(1)).unwrap();

        assert_eq!(
            state::load_last_clearance(store.backend(), MarketId(0)).unwrap(),
            Some(Decimal::new(100, 0))
        );
        assert_eq!(state::load_counter(store.backend()).unwrap(), *engine.counter());
        assert_eq!(engine.counter().full_fills, 2);
        // 4 * 100 * 0.001 = 0.4 per side
        assert_eq!(engine.counter().commissions_collected, Decimal::new(8, 1));
    }
}
