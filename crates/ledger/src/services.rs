//! Service context and shared result types
//!
//! Every service borrows a [`ServiceContext`] for store access and ledger
//! settings.

use premia_config::LedgerConfig;
use premia_core::JournalEntry;
use premia_persistence::{Database, PersistenceResult, UnitOfWork};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::SqlitePool;

/// Context for ledger operations - contains database access and settings
pub struct ServiceContext {
    pool: SqlitePool,
    config: LedgerConfig,
}

impl ServiceContext {
    /// Create new service context from database
    pub fn new(db: &Database, config: LedgerConfig) -> Self {
        Self {
            pool: db.pool().clone(),
            config,
        }
    }

    /// Get database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Ledger settings
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Open a unit of work on the pool
    pub async fn begin(&self) -> PersistenceResult<UnitOfWork> {
        UnitOfWork::begin(&self.pool).await
    }
}

/// Outcome of a committed posting
#[derive(Debug, Clone, Serialize)]
pub struct PostingReceipt {
    /// The journal entry that was appended
    pub entry: JournalEntry,
    /// Debit account balance after the posting
    pub debit_balance: Decimal,
    /// Credit account balance after the posting
    pub credit_balance: Decimal,
    /// Attempts taken, 1 when no conflict was hit
    pub attempts: u32,
}

impl PostingReceipt {
    pub fn new(entry: JournalEntry, debit_balance: Decimal, credit_balance: Decimal) -> Self {
        Self {
            entry,
            debit_balance,
            credit_balance,
            attempts: 1,
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }
}
