//! # Error Module
//!
//! Domain errors for the ledger model, built with thiserror.

use rust_decimal::Decimal;
use thiserror::Error;

/// Core domain errors.
///
/// Pure validation failures, unrelated to infrastructure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Invalid amount: {0} (must be greater than zero)")]
    InvalidAmount(Decimal),

    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    #[error("Unknown account type: {0}")]
    UnknownAccountType(String),

    #[error("Unknown transaction type: {0}")]
    UnknownTransactionType(String),
}

/// Result type alias with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Whether this is an amount validation error
    pub fn is_invalid_amount(&self) -> bool {
        matches!(self, CoreError::InvalidAmount(_))
    }
}
