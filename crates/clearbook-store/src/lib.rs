//! # clearbook-store
//!
//! **Ordered order store for ClearBook.**
//!
//! The store is the only owner of resting orders. It sits on top of a host
//! key-value backend ([`KvStore`]) and offers:
//!
//! - **Point access**: `get`, `has`, `set`, `delete` (idempotent)
//! - **Deterministic iteration**: ascending order ID, forward or reverse
//! - **Queries**: full listing and conjunctive filters with 1-indexed pages
//! - **Engine state**: lifetime counter and last clearance price per market

pub mod filter;
pub mod keys;
pub mod kv;
pub mod order_store;
pub mod state;

pub use filter::OrdersFilter;
pub use kv::{KvIter, KvPair, KvStore, MemStore, Traversal};
pub use order_store::{OrderIter, OrderStore};
