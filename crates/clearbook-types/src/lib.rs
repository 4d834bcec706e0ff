//! # clearbook-types
//!
//! Shared types, errors, and configuration for the **ClearBook** batch
//! auction engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`OrderId`], [`MarketId`], [`Owner`], [`CycleId`]
//! - **Order model**: [`Order`], [`Direction`]
//! - **Fill model**: [`OrderFill`], [`FillState`]
//! - **Cycle output**: [`ClearanceState`], [`MatcherResult`]
//! - **Lifetime totals**: [`Counter`], [`CounterDelta`]
//! - **Configuration**: [`EngineConfig`], [`MarketConfig`]
//! - **Errors**: [`ClearbookError`] with `CB_ERR_` prefix codes
//! - **Codec**: length-prefixed [`codec::encode`] / [`codec::decode`]
//! - **Formatting**: [`format::format_fixed`] and fixed-point rounding helpers
//! - **Constants**: system-wide limits and defaults

pub mod codec;
pub mod config;
pub mod constants;
pub mod counter;
pub mod error;
pub mod fill;
pub mod format;
pub mod ids;
pub mod order;
pub mod result;

// Re-export all primary types at crate root for ergonomic imports:
//   use clearbook_types::{Order, Direction, MatcherResult, ...};

pub use config::*;
pub use counter::*;
pub use error::*;
pub use fill::*;
pub use ids::*;
pub use order::*;
pub use result::*;

// Constants, codec and format helpers are accessed through their modules
// (`clearbook_types::constants::FOO`) to avoid name collisions.
