//! Ledger layer errors
//!
//! The public error taxonomy of the ledger. Lower layer errors are folded
//! into it so callers can match on what happened, not where.

use premia_core::{AccountId, AccountType, CoreError};
use premia_persistence::PersistenceError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Ledger operation errors
#[derive(Debug, Error)]
pub enum LedgerError {
    // === Validation errors ===
    #[error("Invalid amount: {0} (must be positive)")]
    InvalidAmount(Decimal),

    #[error("Account {account} is {actual}, expected {expected}")]
    RoleMismatch {
        account: AccountId,
        expected: AccountType,
        actual: AccountType,
    },

    // === Not found errors ===
    #[error("Not found: {entity} {id}")]
    NotFound { entity: String, id: String },

    // === Posting errors ===
    #[error("Transaction aborted: {0}")]
    TransactionAbort(String),

    // === Wrapped errors ===
    #[error("Persistence error: {0}")]
    Persistence(PersistenceError),

    /// Non-amount core errors (malformed ids, unknown type names) that a
    /// caller converts with `From<CoreError>`. No ledger operation raises
    /// one itself.
    #[error("Core error: {0}")]
    Core(CoreError),
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    /// Create role mismatch error
    pub fn role_mismatch(account: AccountId, expected: AccountType, actual: AccountType) -> Self {
        Self::RoleMismatch {
            account,
            expected,
            actual,
        }
    }

    /// Create transaction abort error
    pub fn abort(reason: impl Into<String>) -> Self {
        Self::TransactionAbort(reason.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_invalid_amount(&self) -> bool {
        matches!(self, Self::InvalidAmount(_))
    }

    pub fn is_abort(&self) -> bool {
        matches!(self, Self::TransactionAbort(_))
    }
}

impl From<PersistenceError> for LedgerError {
    fn from(err: PersistenceError) -> Self {
        if err.is_conflict() {
            return Self::TransactionAbort(err.to_string());
        }
        match err {
            PersistenceError::NotFound { entity, id } => Self::NotFound { entity, id },
            PersistenceError::Commit(e) => Self::TransactionAbort(format!("commit failed: {e}")),
            other => Self::Persistence(other),
        }
    }
}

impl From<CoreError> for LedgerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidAmount(value) => Self::InvalidAmount(value),
            other => Self::Core(other),
        }
    }
}
