//! # Account Module
//!
//! A ledger account: identity, role in the premium flow, and balance.
//!
//! Accounts are created once, optionally with a seed balance, and are never
//! deleted. Their balance only changes through a posting.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque account identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First 8 characters, for compact display
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for AccountId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| CoreError::InvalidId(s.to_string()))
    }
}

/// Role an account plays in the premium money flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Money received through the payment gateway
    GatewayAsset,
    /// Funds held on behalf of a client
    ClientLiability,
    /// Premiums owed to the underwriter
    UnderwriterPayable,
    /// Commission earned by the agent
    AgentEarned,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::GatewayAsset => "gateway_asset",
            AccountType::ClientLiability => "client_liability",
            AccountType::UnderwriterPayable => "underwriter_payable",
            AccountType::AgentEarned => "agent_earned",
        }
    }

    pub fn all() -> [AccountType; 4] {
        [
            AccountType::GatewayAsset,
            AccountType::ClientLiability,
            AccountType::UnderwriterPayable,
            AccountType::AgentEarned,
        ]
    }
}

impl FromStr for AccountType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gateway_asset" | "gateway" => Ok(AccountType::GatewayAsset),
            "client_liability" | "client" => Ok(AccountType::ClientLiability),
            "underwriter_payable" | "underwriter" => Ok(AccountType::UnderwriterPayable),
            "agent_earned" | "agent" => Ok(AccountType::AgentEarned),
            _ => Err(CoreError::UnknownAccountType(s.to_string())),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ledger account.
///
/// `opening_balance` is the seed balance given at creation. It never changes
/// and is the starting point when the balance is replayed from the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub account_type: AccountType,
    pub balance: Decimal,
    pub opening_balance: Decimal,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with a fresh id. Any sign of seed balance is allowed.
    pub fn new(account_type: AccountType, initial_balance: Decimal, name: &str) -> Self {
        Self {
            id: AccountId::new(),
            account_type,
            balance: initial_balance,
            opening_balance: initial_balance,
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Net movement posted since creation
    pub fn net_movement(&self) -> Decimal {
        self.balance - self.opening_balance
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Account {} ({}, {}, balance: {})",
            self.id, self.name, self.account_type, self.balance
        )
    }
}
