//! Posting commands - top-up, premium, commission

use anyhow::{Context, Result};
use premia_ledger::{LedgerService, PostingReceipt, ServiceContext};
use rust_decimal::Decimal;

use super::parse_account_id;

pub async fn top_up(
    ctx: &ServiceContext,
    client: &str,
    gateway: &str,
    amount: Decimal,
    tranref: &str,
) -> Result<()> {
    let client = parse_account_id(client)?;
    let gateway = parse_account_id(gateway)?;

    let receipt = LedgerService::new(ctx)
        .client_account_top_up(&client, &gateway, amount, tranref)
        .await
        .context("Top-up failed")?;
    print_receipt(&receipt);
    Ok(())
}

pub async fn premium(
    ctx: &ServiceContext,
    client: &str,
    underwriter: &str,
    amount: Decimal,
    tranref: &str,
) -> Result<()> {
    let client = parse_account_id(client)?;
    let underwriter = parse_account_id(underwriter)?;

    let receipt = LedgerService::new(ctx)
        .client_premium_payment(&client, &underwriter, amount, tranref)
        .await
        .context("Premium payment failed")?;
    print_receipt(&receipt);
    Ok(())
}

pub async fn commission(
    ctx: &ServiceContext,
    underwriter: &str,
    agent: &str,
    amount: Decimal,
    tranref: &str,
) -> Result<()> {
    let underwriter = parse_account_id(underwriter)?;
    let agent = parse_account_id(agent)?;

    let receipt = LedgerService::new(ctx)
        .post_agent_commission(&underwriter, &agent, amount, tranref)
        .await
        .context("Commission payment failed")?;
    print_receipt(&receipt);
    Ok(())
}

fn print_receipt(receipt: &PostingReceipt) {
    println!("✅ Posted {}", receipt.entry);
    println!(
        "   Debit  {}: {}",
        receipt.entry.debit_account, receipt.debit_balance
    );
    println!(
        "   Credit {}: {}",
        receipt.entry.credit_account, receipt.credit_balance
    );
    if receipt.attempts > 1 {
        println!("   Attempts: {}", receipt.attempts);
    }
}
