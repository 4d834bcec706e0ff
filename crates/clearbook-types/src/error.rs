//! Error types for the ClearBook engine.
//!
//! All errors use the `CB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Order / query errors
//! - 5xx: Matching errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::OrderId;

/// Central error enum for all ClearBook operations.
#[derive(Debug, Error)]
pub enum ClearbookError {
    // =================================================================
    // Order / Query Errors (1xx)
    // =================================================================
    /// The requested order is not in the store.
    #[error("CB_ERR_100: Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Malformed query parameters (pagination, filters, unknown market).
    /// Rejected before any store access.
    #[error("CB_ERR_101: Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    // =================================================================
    // Matching Errors (5xx)
    // =================================================================
    /// A cycle produced state that must never exist (negative quantity,
    /// over-fill, unbalanced volume). Fatal to the whole cycle.
    #[error("CB_ERR_500: Invariant violation: {reason}")]
    InvariantViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Fault in the host key-value store. Never retried.
    #[error("CB_ERR_900: Storage error: {0}")]
    Storage(String),

    /// Serialization / deserialization error.
    #[error("CB_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config, missing fields, etc.).
    #[error("CB_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

impl ClearbookError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn invariant(reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            reason: reason.into(),
        }
    }

    /// `true` for errors that must abort the running cycle.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvariantViolation { .. } | Self::Storage(_) | Self::Serialization(_)
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, ClearbookError>;

impl From<serde_json::Error> for ClearbookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
