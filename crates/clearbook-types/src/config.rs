//! Configuration types for the engine and its markets.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ClearbookError, MarketId, Result, constants};

/// Per-market configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Market identifier used by orders.
    pub id: MarketId,
    /// Base asset (e.g., "BTC").
    pub base: String,
    /// Quote asset (e.g., "XFI").
    pub quote: String,
    /// Decimal places of the smallest quantity unit. Pro-rata fills are
    /// floored to this scale.
    pub quantity_scale: u32,
    /// Decimal places of the price tick.
    pub price_scale: u32,
    /// Decimal places of quote amounts and commissions.
    pub quote_scale: u32,
    /// Commission charged on each fill's quote value, in `[0, 1)`.
    pub commission_rate: Decimal,
}

impl MarketConfig {
    #[must_use]
    pub fn new(id: MarketId, base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            id,
            base: base.into(),
            quote: quote.into(),
            quantity_scale: constants::QTY_PRECISION,
            price_scale: constants::PRICE_PRECISION,
            quote_scale: constants::QUOTE_PRECISION,
            commission_rate: Decimal::ZERO,
        }
    }

    /// Default BTC/XFI market with 0.1% commission.
    #[must_use]
    pub fn btc_xfi(id: MarketId) -> Self {
        Self {
            commission_rate: Decimal::new(1, 3),
            ..Self::new(id, "BTC", "XFI")
        }
    }

    /// Default ETH/XFI market with 0.1% commission.
    #[must_use]
    pub fn eth_xfi(id: MarketId) -> Self {
        Self {
            commission_rate: Decimal::new(1, 3),
            ..Self::new(id, "ETH", "XFI")
        }
    }

    #[must_use]
    pub fn with_quantity_scale(mut self, scale: u32) -> Self {
        self.quantity_scale = scale;
        self
    }

    #[must_use]
    pub fn with_quote_scale(mut self, scale: u32) -> Self {
        self.quote_scale = scale;
        self
    }

    #[must_use]
    pub fn with_commission_rate(mut self, rate: Decimal) -> Self {
        self.commission_rate = rate;
        self
    }

    /// Returns the market symbol (e.g., "BTC/XFI").
    #[must_use]
    pub fn symbol(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base.is_empty() || self.quote.is_empty() {
            return Err(ClearbookError::Configuration(format!(
                "{}: base and quote assets must be non-empty",
                self.id
            )));
        }
        for (name, scale) in [
            ("quantity_scale", self.quantity_scale),
            ("price_scale", self.price_scale),
            ("quote_scale", self.quote_scale),
        ] {
            if scale > constants::MAX_SCALE {
                return Err(ClearbookError::Configuration(format!(
                    "{}: {name} {scale} exceeds max {}",
                    self.id,
                    constants::MAX_SCALE
                )));
            }
        }
        if self.commission_rate < Decimal::ZERO || self.commission_rate >= Decimal::ONE {
            return Err(ClearbookError::Configuration(format!(
                "{}: commission_rate {} outside [0, 1)",
                self.id, self.commission_rate
            )));
        }
        Ok(())
    }
}

/// Engine configuration: the set of markets the scheduler may run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub markets: Vec<MarketConfig>,
    /// Page size applied by query helpers when the caller passes none.
    #[serde(default = "default_page_limit")]
    pub default_page_limit: u64,
}

fn default_page_limit() -> u64 {
    constants::DEFAULT_PAGE_LIMIT
}

impl EngineConfig {
    #[must_use]
    pub fn new(markets: Vec<MarketConfig>) -> Self {
        Self {
            markets,
            default_page_limit: constants::DEFAULT_PAGE_LIMIT,
        }
    }

    /// Parse and validate a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| ClearbookError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.markets.is_empty() {
            return Err(ClearbookError::Configuration(
                "at least one market must be configured".into(),
            ));
        }
        if self.default_page_limit == 0 {
            return Err(ClearbookError::Configuration(
                "default_page_limit must be >= 1".into(),
            ));
        }
        let mut seen = BTreeSet::new();
        for market in &self.markets {
            market.validate()?;
            if !seen.insert(market.id) {
                return Err(ClearbookError::Configuration(format!(
                    "duplicate market id {}",
                    market.id
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn market(&self, id: MarketId) -> Option<&MarketConfig> {
        self.markets.iter().find(|m| m.id == id)
    }

    /// Configured market IDs in ascending order.
    #[must_use]
    pub fn market_ids(&self) -> Vec<MarketId> {
        let mut ids: Vec<MarketId> = self.markets.iter().map(|m| m.id).collect();
        ids.sort_unstable();
        ids
    }
}
