//! Lifetime running totals of matching activity.
//!
//! The [`Counter`] is loaded once when the engine starts, grows after every
//! successful cycle and is written back to the store with the cycle's other
//! mutations. It is never reset during normal operation.

use std::fmt::Write as _;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{OrderFill, format::format_fixed};

/// Lifetime totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub cycles: u64,
    pub fills: u64,
    pub full_fills: u64,
    pub partial_fills: u64,
    /// Matched base volume (bid side; equal to ask side).
    pub matched_volume: Decimal,
    /// Fills that carried a non-zero commission.
    pub commissions: u64,
    pub commissions_collected: Decimal,
}

/// Increments produced by one cycle, applied only after it succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterDelta {
    pub fills: u64,
    pub full_fills: u64,
    pub partial_fills: u64,
    pub matched_volume: Decimal,
    pub commissions: u64,
    pub commissions_collected: Decimal,
}

impl CounterDelta {
    pub fn record_fill(&mut self, fill: &OrderFill) {
        self.fills += 1;
        if fill.is_full() {
            self.full_fills += 1;
        } else {
            self.partial_fills += 1;
        }
        if !fill.commission.is_zero() {
            self.commissions += 1;
            self.commissions_collected += fill.commission;
        }
    }

    pub fn record_matched_volume(&mut self, volume: Decimal) {
        self.matched_volume += volume;
    }
}

impl Counter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one completed cycle into the lifetime totals.
    pub fn absorb(&mut self, delta: &CounterDelta) {
        self.cycles += 1;
        self.fills += delta.fills;
        self.full_fills += delta.full_fills;
        self.partial_fills += delta.partial_fills;
        self.matched_volume += delta.matched_volume;
        self.commissions += delta.commissions;
        self.commissions_collected += delta.commissions_collected;
    }

    /// Multi-line rendering with decimals shown at `precision` places.
    #[must_use]
    pub fn summary(&self, precision: u32) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "Counters:");
        let _ = writeln!(s, "  Cycles:                {}", self.cycles);
        let _ = writeln!(s, "  Fills:                 {}", self.fills);
        let _ = writeln!(s, "  FullFills:             {}", self.full_fills);
        let _ = writeln!(s, "  PartialFills:          {}", self.partial_fills);
        let _ = writeln!(
            s,
            "  MatchedVolume:         {}",
            format_fixed(self.matched_volume, precision)
        );
        let _ = writeln!(s, "  Commissions:           {}", self.commissions);
        let _ = write!(
            s,
            "  CommissionsCollected:  {}",
            format_fixed(self.commissions_collected, precision)
        );
        s
    }
}
