//! # Journal Module
//!
//! Journal entries: the immutable audit trail of every posting.
//!
//! One entry records both legs of a movement. The sign convention used
//! everywhere (posting and reconciliation) is:
//!
//! - the debit leg changes the balance by `-amount`
//! - the credit leg changes the balance by `+amount`

use crate::account::{AccountId, AccountType};
use crate::amount::Amount;
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Default page size for journal listings
pub const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Opaque journal entry identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for EntryId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| CoreError::InvalidId(s.to_string()))
    }
}

/// Business operation that produced an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Client funds arrive through the gateway
    TopUp,
    /// Client pays a premium to the underwriter
    PremiumPayment,
    /// Underwriter pays commission to the agent
    CommissionPayment,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::TopUp => "top_up",
            TransactionType::PremiumPayment => "premium_payment",
            TransactionType::CommissionPayment => "commission_payment",
        }
    }

    /// Expected type of the debited account
    pub fn debit_role(&self) -> AccountType {
        match self {
            TransactionType::TopUp => AccountType::GatewayAsset,
            TransactionType::PremiumPayment => AccountType::ClientLiability,
            TransactionType::CommissionPayment => AccountType::UnderwriterPayable,
        }
    }

    /// Expected type of the credited account
    pub fn credit_role(&self) -> AccountType {
        match self {
            TransactionType::TopUp => AccountType::ClientLiability,
            TransactionType::PremiumPayment => AccountType::UnderwriterPayable,
            TransactionType::CommissionPayment => AccountType::AgentEarned,
        }
    }
}

impl FromStr for TransactionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "top_up" | "topup" => Ok(TransactionType::TopUp),
            "premium_payment" | "premiumpayment" => Ok(TransactionType::PremiumPayment),
            "commission_payment" | "commissionpayment" => Ok(TransactionType::CommissionPayment),
            _ => Err(CoreError::UnknownTransactionType(s.to_string())),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionType::TopUp => "TopUp",
            TransactionType::PremiumPayment => "PremiumPayment",
            TransactionType::CommissionPayment => "CommissionPayment",
        };
        f.write_str(label)
    }
}

/// Side of an entry an account appears on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Leg {
    Debit,
    Credit,
    /// Same account on both sides
    Both,
}

/// One immutable debit/credit pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: EntryId,
    pub tx_type: TransactionType,
    pub amount: Amount,
    /// Caller-supplied correlation reference, shared by chained postings
    pub tranref: String,
    pub debit_account: AccountId,
    pub credit_account: AccountId,
    pub created_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Build a new entry, stamped now, with a fresh id.
    pub fn new(
        tx_type: TransactionType,
        amount: Amount,
        debit_account: AccountId,
        credit_account: AccountId,
        tranref: &str,
    ) -> Self {
        Self {
            id: EntryId::new(),
            tx_type,
            amount,
            tranref: tranref.to_string(),
            debit_account,
            credit_account,
            created_at: Utc::now(),
        }
    }

    /// Which leg(s) the account appears on, if any
    pub fn leg_for(&self, account: &AccountId) -> Option<Leg> {
        match (self.debit_account == *account, self.credit_account == *account) {
            (true, true) => Some(Leg::Both),
            (true, false) => Some(Leg::Debit),
            (false, true) => Some(Leg::Credit),
            (false, false) => None,
        }
    }

    /// Signed effect of this entry on an account's balance.
    pub fn effect_on(&self, account: &AccountId) -> Decimal {
        match self.leg_for(account) {
            Some(Leg::Debit) => self.amount.as_debit(),
            Some(Leg::Credit) => self.amount.as_credit(),
            Some(Leg::Both) | None => Decimal::ZERO,
        }
    }
}

impl fmt::Display for JournalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} | {:.2} | Dr:{} | Cr:{} | {} | Tranref: {}",
            self.id.short(),
            self.tx_type,
            self.amount.value(),
            self.debit_account.short(),
            self.credit_account.short(),
            self.created_at.format("%Y-%m-%d %H:%M:%S"),
            self.tranref
        )
    }
}

/// Normalised limit/skip pair for journal listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub skip: i64,
}

impl Page {
    /// `limit <= 0` falls back to [`DEFAULT_PAGE_LIMIT`], negative `skip` becomes 0.
    pub fn new(limit: i64, skip: i64) -> Self {
        Self {
            limit: if limit <= 0 { DEFAULT_PAGE_LIMIT } else { limit },
            skip: skip.max(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT, 0)
    }
}

/// Sum of debit and credit sides over a set of entries.
///
/// Every entry contributes its amount to both sides, so the two totals of a
/// well-formed journal are always equal.
pub fn side_totals(entries: &[JournalEntry]) -> (Decimal, Decimal) {
    entries.iter().fold((Decimal::ZERO, Decimal::ZERO), |(dr, cr), e| {
        (dr + e.amount.value(), cr + e.amount.value())
    })
}
