//! Journal and reconciliation commands

use anyhow::{Context, Result};
use premia_core::{side_totals, JournalEntry, ReconciliationResult};
use premia_ledger::{LedgerService, ReconciliationEngine, ServiceContext};

use super::parse_account_id;

/// List journal entries
pub async fn journal(
    ctx: &ServiceContext,
    limit: i64,
    skip: i64,
    tranref: Option<&str>,
) -> Result<()> {
    let ledger = LedgerService::new(ctx);

    let entries = match tranref {
        Some(tranref) => ledger
            .get_journal_entries_by_ref(tranref)
            .await
            .with_context(|| format!("Failed to read entries for {}", tranref))?,
        None => ledger
            .get_journal_entries(limit, skip)
            .await
            .context("Failed to read journal")?,
    };

    print_entries(&entries);
    if tranref.is_some() && !entries.is_empty() {
        let (debits, credits) = side_totals(&entries);
        println!("   Debits: {}  Credits: {}", debits, credits);
    }
    Ok(())
}

/// Reconcile one account
pub async fn reconcile(ctx: &ServiceContext, account_id: &str) -> Result<()> {
    let id = parse_account_id(account_id)?;
    let result = ReconciliationEngine::new(ctx)
        .reconcile_account(&id)
        .await
        .with_context(|| format!("Failed to reconcile {}", account_id))?;

    println!("{}", result);
    Ok(())
}

/// Reconcile every account
pub async fn report(ctx: &ServiceContext, json: bool) -> Result<()> {
    let results = ReconciliationEngine::new(ctx)
        .reconciliation_report()
        .await
        .context("Reconciliation report failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    print_report(&results);
    Ok(())
}

fn print_entries(entries: &[JournalEntry]) {
    if entries.is_empty() {
        println!("No journal entries.");
        return;
    }
    for entry in entries {
        println!("{}", entry);
    }
}

fn print_report(results: &[ReconciliationResult]) {
    println!("📋 Reconciliation Report");
    for result in results {
        println!("   {}", result);
    }

    let flagged = results.iter().filter(|r| !r.is_reconciled()).count();
    if flagged == 0 {
        println!("✅ {} account(s), all consistent", results.len());
    } else {
        println!("⚠️  {} of {} account(s) with discrepancies", flagged, results.len());
    }
}
