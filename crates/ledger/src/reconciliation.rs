//! Reconciliation - replay the journal and compare with stored balances
//!
//! Reads run outside any posting transaction. A posting that commits between
//! the account read and the journal read can show up as a transient
//! discrepancy.

use crate::error::LedgerResult;
use crate::services::ServiceContext;
use premia_core::{AccountId, ReconciliationResult};
use premia_persistence::{AccountRepo, JournalRepo};
use tracing::{info, instrument, warn};

/// Reconciliation Engine - audits stored balances against the journal
pub struct ReconciliationEngine<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReconciliationEngine<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Recompute one account's balance from its opening balance and journal legs
    #[instrument(skip_all, fields(account = %account_id))]
    pub async fn reconcile_account(&self, account_id: &AccountId) -> LedgerResult<ReconciliationResult> {
        let account = AccountRepo::get_by_id(self.ctx.pool(), account_id).await?;
        let entries = JournalRepo::list_for_account(self.ctx.pool(), account_id).await?;

        let result = ReconciliationResult::replay(&account, &entries);
        if !result.discrepancy.is_zero() {
            warn!(
                account = %result.account_id,
                stored = %result.stored_balance,
                computed = %result.computed_balance,
                discrepancy = %result.discrepancy,
                "Balance discrepancy"
            );
        }
        Ok(result)
    }

    /// Reconcile every account. The first failure aborts the whole report.
    pub async fn reconciliation_report(&self) -> LedgerResult<Vec<ReconciliationResult>> {
        let accounts = AccountRepo::list_all(self.ctx.pool()).await?;

        let mut results = Vec::with_capacity(accounts.len());
        for account in &accounts {
            results.push(self.reconcile_account(&account.id).await?);
        }

        let discrepancies = results.iter().filter(|r| !r.is_reconciled()).count();
        info!(
            accounts = results.len(),
            discrepancies, "Reconciliation report complete"
        );
        Ok(results)
    }
}
