//! Database schema definitions
//!
//! Row types for sqlx mapping from SQLite tables.
//! Schema is defined in migrations/20261019000000_init.sql

use crate::error::{PersistenceError, PersistenceResult};
use chrono::{DateTime, Utc};
use premia_core::{Account, AccountId, AccountType, Amount, EntryId, JournalEntry, TransactionType};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Row type for table `accounts`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRow {
    pub id: String,
    pub account_type: String,
    pub balance: String,         // Decimal stored as TEXT
    pub opening_balance: String, // Decimal stored as TEXT
    pub name: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

/// Row type for table `journal_entries`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JournalEntryRow {
    /// Insertion order, breaks `created_at` ties
    pub seq: i64,
    pub id: String,
    pub tx_type: String,
    pub amount: String, // Decimal stored as TEXT
    pub tranref: String,
    pub debit_account: String,
    pub credit_account: String,
    pub created_at: DateTime<Utc>,
}

/// Parse a TEXT decimal column
pub(crate) fn parse_decimal(value: &str) -> PersistenceResult<Decimal> {
    Decimal::from_str(value).map_err(|e| PersistenceError::InvalidDecimal(format!("{value}: {e}")))
}

pub(crate) fn parse_account_id(value: &str) -> PersistenceResult<AccountId> {
    AccountId::from_str(value).map_err(|_| PersistenceError::InvalidId(value.to_string()))
}

// === Conversion implementations ===

impl TryFrom<AccountRow> for Account {
    type Error = PersistenceError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let account_type = AccountType::from_str(&row.account_type)
            .map_err(|_| PersistenceError::invalid_enum("account_type", &row.account_type))?;

        Ok(Account {
            id: parse_account_id(&row.id)?,
            account_type,
            balance: parse_decimal(&row.balance)?,
            opening_balance: parse_decimal(&row.opening_balance)?,
            name: row.name,
            created_at: row.created_at,
        })
    }
}

impl From<&Account> for AccountRow {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            account_type: account.account_type.as_str().to_string(),
            balance: account.balance.to_string(),
            opening_balance: account.opening_balance.to_string(),
            name: account.name.clone(),
            version: 0,
            created_at: account.created_at,
        }
    }
}

impl TryFrom<JournalEntryRow> for JournalEntry {
    type Error = PersistenceError;

    fn try_from(row: JournalEntryRow) -> Result<Self, Self::Error> {
        let tx_type = TransactionType::from_str(&row.tx_type)
            .map_err(|_| PersistenceError::invalid_enum("tx_type", &row.tx_type))?;
        let amount = Amount::new(parse_decimal(&row.amount)?)
            .map_err(|e| PersistenceError::InvalidDecimal(e.to_string()))?;
        let id = EntryId::from_str(&row.id).map_err(|_| PersistenceError::InvalidId(row.id.clone()))?;

        Ok(JournalEntry {
            id,
            tx_type,
            amount,
            tranref: row.tranref,
            debit_account: parse_account_id(&row.debit_account)?,
            credit_account: parse_account_id(&row.credit_account)?,
            created_at: row.created_at,
        })
    }
}
