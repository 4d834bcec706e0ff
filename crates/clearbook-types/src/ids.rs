//! Identifiers used throughout ClearBook.
//!
//! Order and market IDs are plain `u64` counters assigned by the host.
//! Their store keys use fixed-width big-endian bytes so that lexicographic
//! byte order equals numeric order.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// OrderId
// ---------------------------------------------------------------------------

/// Unique, monotonically assigned order identifier.
///
/// Ascending `OrderId` is the single source of ordering inside the engine:
/// store iteration, time priority within a price level and pro-rata
/// residual hand-out all follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl OrderId {
    /// Big-endian key bytes; byte order matches numeric order.
    #[must_use]
    pub fn to_key_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Inverse of [`OrderId::to_key_bytes`]. `None` unless exactly 8 bytes.
    #[must_use]
    pub fn from_key_bytes(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; 8] = bytes.try_into().ok()?;
        Some(Self(u64::from_be_bytes(raw)))
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// MarketId
// ---------------------------------------------------------------------------

/// Identifies a trading pair. Orders are partitioned by market for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct MarketId(pub u64);

impl MarketId {
    #[must_use]
    pub fn to_key_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "market:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Owner
// ---------------------------------------------------------------------------

/// Account reference of an order owner. Opaque to the engine; only
/// compared for equality by the store filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Owner(pub String);

impl Owner {
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// CycleId
// ---------------------------------------------------------------------------

/// Monotonically increasing identifier of a matching cycle, supplied by
/// the host scheduler (typically the block height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CycleId(pub u64);

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cycle:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
