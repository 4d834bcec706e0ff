//! System-wide constants for the ClearBook engine.

/// Default decimal precision for prices (8 decimal places).
pub const PRICE_PRECISION: u32 = 8;

/// Default decimal precision for quantities (8 decimal places).
pub const QTY_PRECISION: u32 = 8;

/// Default decimal precision for quote amounts and commissions.
pub const QUOTE_PRECISION: u32 = 8;

/// Decimal places kept when truncating the pro-rata fraction.
pub const PRO_RATA_PRECISION: u32 = 18;

/// Largest scale a market may configure for any of its decimals.
pub const MAX_SCALE: u32 = 18;

/// Page size used when a caller does not pass one.
pub const DEFAULT_PAGE_LIMIT: u64 = 100;

/// Store key prefix for orders: `o/` ++ big-endian order ID.
pub const ORDER_KEY_PREFIX: &[u8] = b"o/";

/// Store key holding the persisted lifetime [`Counter`](crate::Counter).
pub const COUNTER_KEY: &[u8] = b"c/counter";

/// Store key prefix for the last clearance price of each market.
pub const CLEARANCE_KEY_PREFIX: &[u8] = b"p/";

/// Width of the codec length prefix in bytes.
pub const LENGTH_PREFIX_BYTES: usize = 4;

/// Largest payload the codec accepts (16 MiB).
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "ClearBook";
