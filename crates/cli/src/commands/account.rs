//! Account management commands

use anyhow::{Context, Result};
use premia_core::Account;
use premia_ledger::{LedgerService, ServiceContext};
use rust_decimal::Decimal;

use super::parse_account_id;
use crate::{AccountAction, AccountTypeArg};

/// Handle account subcommands
pub async fn handle(ctx: &ServiceContext, action: AccountAction) -> Result<()> {
    let ledger = LedgerService::new(ctx);

    match action {
        AccountAction::Create {
            r#type,
            name,
            balance,
        } => create_account(&ledger, r#type, &name, balance).await,
        AccountAction::List => list_accounts(&ledger).await,
        AccountAction::Show { account_id } => show_account(&ledger, &account_id).await,
        AccountAction::Balance { account_id } => show_balance(&ledger, &account_id).await,
    }
}

async fn create_account(
    ledger: &LedgerService<'_>,
    account_type: AccountTypeArg,
    name: &str,
    balance: Decimal,
) -> Result<()> {
    let account = ledger
        .create_account(account_type.to_core_type(), balance, name)
        .await
        .context("Failed to create account")?;

    println!("✅ Created {} account:", account.account_type);
    print_account(&account);
    Ok(())
}

async fn list_accounts(ledger: &LedgerService<'_>) -> Result<()> {
    let accounts = ledger.list_accounts().await.context("Failed to list accounts")?;

    if accounts.is_empty() {
        println!("No accounts. Create one with 'premia account create'.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<20}  {:>18}  {}",
        "ID", "TYPE", "BALANCE", "NAME"
    );
    for account in &accounts {
        println!(
            "{:<36}  {:<20}  {:>18}  {}",
            account.id, account.account_type, account.balance, account.name
        );
    }
    println!("{} account(s)", accounts.len());
    Ok(())
}

async fn show_account(ledger: &LedgerService<'_>, account_id: &str) -> Result<()> {
    let id = parse_account_id(account_id)?;
    let account = ledger
        .get_account_by_id(&id)
        .await
        .with_context(|| format!("Failed to load account {}", account_id))?;

    print_account(&account);
    println!("   Net movement: {}", account.net_movement());
    Ok(())
}

async fn show_balance(ledger: &LedgerService<'_>, account_id: &str) -> Result<()> {
    let id = parse_account_id(account_id)?;
    let balance = ledger
        .get_account_balance(&id)
        .await
        .with_context(|| format!("Failed to load balance of {}", account_id))?;

    println!("{}", balance);
    Ok(())
}

fn print_account(account: &Account) {
    println!("   ID:      {}", account.id);
    println!("   Type:    {}", account.account_type);
    println!("   Name:    {}", account.name);
    println!("   Balance: {}", account.balance);
    println!("   Opening: {}", account.opening_balance);
    println!("   Created: {}", account.created_at.format("%Y-%m-%d %H:%M:%S"));
}
