//! # Reconciliation Module
//!
//! Pure replay of an account's journal legs and comparison against the
//! stored balance. Loading the data is the ledger crate's job.

use crate::account::{Account, AccountId, AccountType};
use crate::journal::JournalEntry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of reconciling one account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconciliationStatus {
    Reconciled,
    Discrepancy,
    NoTransactions,
}

impl ReconciliationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconciliationStatus::Reconciled => "RECONCILED",
            ReconciliationStatus::Discrepancy => "DISCREPANCY",
            ReconciliationStatus::NoTransactions => "NO_TRANSACTIONS",
        }
    }
}

impl fmt::Display for ReconciliationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored vs. replayed balance of one account.
///
/// A `Discrepancy` status is a finding, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub account_id: AccountId,
    pub account_type: AccountType,
    pub stored_balance: Decimal,
    pub computed_balance: Decimal,
    /// `computed_balance - stored_balance`
    pub discrepancy: Decimal,
    pub status: ReconciliationStatus,
    pub journal_count: usize,
}

impl ReconciliationResult {
    /// Replay `entries` (oldest first) on top of the account's opening balance.
    ///
    /// Entries that do not touch the account contribute nothing.
    pub fn replay(account: &Account, entries: &[JournalEntry]) -> Self {
        let computed = entries
            .iter()
            .fold(account.opening_balance, |balance, entry| {
                balance + entry.effect_on(&account.id)
            });

        let discrepancy = computed - account.balance;
        let status = if entries.is_empty() {
            ReconciliationStatus::NoTransactions
        } else if !discrepancy.is_zero() {
            ReconciliationStatus::Discrepancy
        } else {
            ReconciliationStatus::Reconciled
        };

        Self {
            account_id: account.id,
            account_type: account.account_type,
            stored_balance: account.balance,
            computed_balance: computed,
            discrepancy,
            status,
            journal_count: entries.len(),
        }
    }

    pub fn is_reconciled(&self) -> bool {
        self.status != ReconciliationStatus::Discrepancy
    }
}

impl fmt::Display for ReconciliationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) stored={} computed={} diff={} entries={} [{}]",
            self.account_id,
            self.account_type,
            self.stored_balance,
            self.computed_balance,
            self.discrepancy,
            self.journal_count,
            self.status
        )
    }
}
