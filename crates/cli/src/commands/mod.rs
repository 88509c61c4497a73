//! Command handlers

pub mod account;
pub mod audit;
pub mod posting;

use anyhow::{Context, Result};
use premia_core::AccountId;

/// Parse an account ID argument
pub fn parse_account_id(value: &str) -> Result<AccountId> {
    value
        .parse()
        .with_context(|| format!("'{}' is not a valid account ID", value))
}
