//! # clearbook-matchcore
//!
//! **Deterministic batch clearance engine for ClearBook.**
//!
//! Each cycle runs every configured market independently, in ascending
//! market ID, against the order store:
//!
//! - **Curves**: resting orders grouped into price levels per side
//! - **Clearance**: the single price that maximizes matched volume
//! - **Pro-rata**: the long side's marginal level is rationed, residual
//!   units go to the lowest order IDs
//! - **Deterministic output**: same store -> same fills and `fill_root`
//!   on every replica

pub mod allocator;
pub mod assembler;
pub mod clearing;
pub mod curve;
pub mod determinism;
pub mod engine;
pub mod price_level;

pub use allocator::{Allocation, apply_fills, plan_fills};
pub use assembler::assemble_result;
pub use clearing::{Clearance, MarginalLevel, SideAllocation, compute_clearance};
pub use curve::{Curve, MarketCurves, build_curves};
pub use determinism::{compute_fill_root, fill_root_hex, verify_fill_root};
pub use engine::MatchingEngine;
pub use price_level::PriceLevel;
