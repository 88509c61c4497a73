//! Ledger operations - accounts, double-entry postings, journal queries
//!
//! LedgerService implements the money movements of the premium flow. Every
//! posting debits one account, credits another and appends exactly one
//! journal entry, all inside one unit of work.

use crate::error::{LedgerError, LedgerResult};
use crate::services::{PostingReceipt, ServiceContext};
use premia_core::{Account, AccountId, AccountType, Amount, JournalEntry, Page, TransactionType};
use premia_persistence::{AccountRepo, JournalRepo, PersistenceResult, UnitOfWork};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

/// Ledger Service - handles account lifecycle, postings and journal reads
pub struct LedgerService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LedgerService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    // ------------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------------

    /// Create an account seeded with `initial_balance` (any sign allowed)
    pub async fn create_account(
        &self,
        account_type: AccountType,
        initial_balance: Decimal,
        name: &str,
    ) -> LedgerResult<Account> {
        let account = Account::new(account_type, initial_balance, name);
        AccountRepo::insert(self.ctx.pool(), &account).await?;

        info!(
            account = %account.id,
            account_type = %account.account_type,
            balance = %account.balance,
            "Account created"
        );
        Ok(account)
    }

    pub async fn get_account_by_id(&self, id: &AccountId) -> LedgerResult<Account> {
        Ok(AccountRepo::get_by_id(self.ctx.pool(), id).await?)
    }

    pub async fn get_account_balance(&self, id: &AccountId) -> LedgerResult<Decimal> {
        Ok(AccountRepo::get_balance(self.ctx.pool(), id).await?)
    }

    /// All accounts, oldest first
    pub async fn list_accounts(&self) -> LedgerResult<Vec<Account>> {
        Ok(AccountRepo::list_all(self.ctx.pool()).await?)
    }

    // ------------------------------------------------------------------------
    // Postings
    // ------------------------------------------------------------------------

    /// Client funds arrive: debit gateway, credit client
    pub async fn client_account_top_up(
        &self,
        client: &AccountId,
        gateway: &AccountId,
        amount: Decimal,
        tranref: &str,
    ) -> LedgerResult<PostingReceipt> {
        self.post_double_entry(TransactionType::TopUp, amount, gateway, client, tranref)
            .await
    }

    /// Client pays a premium: debit client, credit underwriter
    pub async fn client_premium_payment(
        &self,
        client: &AccountId,
        underwriter: &AccountId,
        amount: Decimal,
        tranref: &str,
    ) -> LedgerResult<PostingReceipt> {
        self.post_double_entry(TransactionType::PremiumPayment, amount, client, underwriter, tranref)
            .await
    }

    /// Underwriter pays commission: debit underwriter, credit agent
    pub async fn post_agent_commission(
        &self,
        underwriter: &AccountId,
        agent: &AccountId,
        amount: Decimal,
        tranref: &str,
    ) -> LedgerResult<PostingReceipt> {
        self.post_double_entry(
            TransactionType::CommissionPayment,
            amount,
            underwriter,
            agent,
            tranref,
        )
        .await
    }

    /// Move `amount` from `debit` to `credit` and record one journal entry.
    ///
    /// Nothing is written when this returns an error.
    #[instrument(skip_all, fields(tx_type = %tx_type, amount = %amount, tranref = %tranref))]
    async fn post_double_entry(
        &self,
        tx_type: TransactionType,
        amount: Decimal,
        debit: &AccountId,
        credit: &AccountId,
        tranref: &str,
    ) -> LedgerResult<PostingReceipt> {
        let amount = Amount::new(amount)?;

        if self.ctx.config().enforce_account_roles {
            self.check_roles(tx_type, debit, credit).await?;
        }

        let entry = JournalEntry::new(tx_type, amount, *debit, *credit, tranref);

        match self.ctx.config().posting_timeout() {
            Some(limit) => tokio::time::timeout(limit, self.post_with_retry(entry))
                .await
                .map_err(|_| {
                    warn!(?limit, "Posting timed out");
                    LedgerError::abort(format!("posting timed out after {limit:?}"))
                })?,
            None => self.post_with_retry(entry).await,
        }
    }

    async fn post_with_retry(&self, entry: JournalEntry) -> LedgerResult<PostingReceipt> {
        let max_retries = self.ctx.config().max_conflict_retries;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match self.apply(&entry).await {
                Ok((debit_balance, credit_balance)) => {
                    info!(
                        entry = %entry.id,
                        debit = %entry.debit_account,
                        credit = %entry.credit_account,
                        attempt,
                        "Posting committed"
                    );
                    return Ok(PostingReceipt::new(entry, debit_balance, credit_balance)
                        .with_attempts(attempt));
                }
                Err(err) if err.is_conflict() && attempt <= max_retries => {
                    warn!(attempt, error = %err, "Write conflict, retrying posting");
                    tokio::time::sleep(self.ctx.config().backoff(attempt)).await;
                }
                Err(err) if err.is_conflict() => {
                    warn!(attempt, error = %err, "Conflict retries exhausted");
                    return Err(LedgerError::abort(format!(
                        "gave up after {attempt} attempts: {err}"
                    )));
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// One attempt: open, write both legs and the entry, commit
    async fn apply(&self, entry: &JournalEntry) -> PersistenceResult<(Decimal, Decimal)> {
        let mut uow = self.ctx.begin().await?;

        match Self::write_legs(&mut uow, entry).await {
            Ok(balances) => {
                uow.commit().await?;
                Ok(balances)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    async fn write_legs(
        uow: &mut UnitOfWork,
        entry: &JournalEntry,
    ) -> PersistenceResult<(Decimal, Decimal)> {
        let debit_balance = AccountRepo::increment_balance(
            uow.conn(),
            &entry.debit_account,
            entry.amount.as_debit(),
        )
        .await?;
        let credit_balance = AccountRepo::increment_balance(
            uow.conn(),
            &entry.credit_account,
            entry.amount.as_credit(),
        )
        .await?;
        JournalRepo::append(uow.conn(), entry).await?;
        Ok((debit_balance, credit_balance))
    }

    async fn check_roles(
        &self,
        tx_type: TransactionType,
        debit: &AccountId,
        credit: &AccountId,
    ) -> LedgerResult<()> {
        for (id, expected) in [(debit, tx_type.debit_role()), (credit, tx_type.credit_role())] {
            let account = AccountRepo::get_by_id(self.ctx.pool(), id).await?;
            if account.account_type != expected {
                return Err(LedgerError::role_mismatch(*id, expected, account.account_type));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Journal
    // ------------------------------------------------------------------------

    /// Most recent entries first. `limit <= 0` means 50, negative `skip` means 0.
    pub async fn get_journal_entries(&self, limit: i64, skip: i64) -> LedgerResult<Vec<JournalEntry>> {
        Ok(JournalRepo::list_recent(self.ctx.pool(), Page::new(limit, skip)).await?)
    }

    /// Entries sharing a reference, in posting order
    pub async fn get_journal_entries_by_ref(&self, tranref: &str) -> LedgerResult<Vec<JournalEntry>> {
        Ok(JournalRepo::list_by_reference(self.ctx.pool(), tranref).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use premia_config::{DatabaseConfig, LedgerConfig};
    use premia_core::side_totals;
    use premia_persistence::Database;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    async fn setup_with(config: LedgerConfig) -> (TempDir, ServiceContext) {
        let dir = TempDir::new().unwrap();
        let db = Database::connect(&DatabaseConfig::for_path(dir.path().join("ledger.db")))
            .await
            .unwrap();
        (dir, ServiceContext::new(&db, config))
    }

    async fn setup() -> (TempDir, ServiceContext) {
        setup_with(LedgerConfig::default()).await
    }

    async fn journal_len(ctx: &ServiceContext) -> i64 {
        JournalRepo::count(ctx.pool()).await.unwrap()
    }

    #[tokio::test]
    async fn test_top_up_moves_funds() {
        let (_dir, ctx) = setup().await;
        let ledger = LedgerService::new(&ctx);
        let client = ledger
            .create_account(AccountType::ClientLiability, dec!(0), "Client")
            .await
            .unwrap();
        let gateway = ledger
            .create_account(AccountType::GatewayAsset, dec!(0), "Gateway")
            .await
            .unwrap();

        let receipt = ledger
            .client_account_top_up(&client.id, &gateway.id, dec!(1000), "t1")
            .await
            .unwrap();

        assert_eq!(receipt.debit_balance, dec!(-1000));
        assert_eq!(receipt.credit_balance, dec!(1000));
        assert_eq!(receipt.attempts, 1);
        assert_eq!(ledger.get_account_balance(&client.id).await.unwrap(), dec!(1000));
        assert_eq!(ledger.get_account_balance(&gateway.id).await.unwrap(), dec!(-1000));

        let entries = ledger.get_journal_entries_by_ref("t1").await.unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.tx_type, TransactionType::TopUp);
        assert_eq!(entry.amount.value(), dec!(1000));
        assert_eq!(entry.debit_account, gateway.id);
        assert_eq!(entry.credit_account, client.id);
        assert_eq!(entry, &receipt.entry);
    }

    #[tokio::test]
    async fn test_premium_payment_from_seeded_client() {
        let (_dir, ctx) = setup().await;
        let ledger = LedgerService::new(&ctx);
        let client = ledger
            .create_account(AccountType::ClientLiability, dec!(1500), "Client")
            .await
            .unwrap();
        let underwriter = ledger
            .create_account(AccountType::UnderwriterPayable, dec!(0), "Underwriter")
            .await
            .unwrap();

        ledger
            .client_premium_payment(&client.id, &underwriter.id, dec!(800), "p1")
            .await
            .unwrap();

        assert_eq!(ledger.get_account_balance(&client.id).await.unwrap(), dec!(700));
        assert_eq!(ledger.get_account_balance(&underwriter.id).await.unwrap(), dec!(800));
    }

    #[tokio::test]
    async fn test_chain_under_one_reference_balances() {
        let (_dir, ctx) = setup().await;
        let ledger = LedgerService::new(&ctx);
        let gateway = ledger
            .create_account(AccountType::GatewayAsset, dec!(0), "Gateway")
            .await
            .unwrap();
        let client = ledger
            .create_account(AccountType::ClientLiability, dec!(0), "Client")
            .await
            .unwrap();
        let underwriter = ledger
            .create_account(AccountType::UnderwriterPayable, dec!(0), "Underwriter")
            .await
            .unwrap();
        let agent = ledger
            .create_account(AccountType::AgentEarned, dec!(0), "Agent")
            .await
            .unwrap();

        ledger
            .client_account_top_up(&client.id, &gateway.id, dec!(1000), "t3")
            .await
            .unwrap();
        ledger
            .client_premium_payment(&client.id, &underwriter.id, dec!(700), "t3")
            .await
            .unwrap();
        ledger
            .post_agent_commission(&underwriter.id, &agent.id, dec!(70), "t3")
            .await
            .unwrap();

        let entries = ledger.get_journal_entries_by_ref("t3").await.unwrap();
        let types: Vec<_> = entries.iter().map(|e| e.tx_type).collect();
        assert_eq!(
            types,
            vec![
                TransactionType::TopUp,
                TransactionType::PremiumPayment,
                TransactionType::CommissionPayment
            ]
        );
        assert_eq!(side_totals(&entries), (dec!(1770), dec!(1770)));

        assert_eq!(ledger.get_account_balance(&client.id).await.unwrap(), dec!(300));
        assert_eq!(ledger.get_account_balance(&underwriter.id).await.unwrap(), dec!(630));
        assert_eq!(ledger.get_account_balance(&agent.id).await.unwrap(), dec!(70));
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let (_dir, ctx) = setup().await;
        let ledger = LedgerService::new(&ctx);
        let client = ledger
            .create_account(AccountType::ClientLiability, dec!(10), "Client")
            .await
            .unwrap();
        let gateway = ledger
            .create_account(AccountType::GatewayAsset, dec!(0), "Gateway")
            .await
            .unwrap();

        for bad in [dec!(0), dec!(-5)] {
            let err = ledger
                .client_account_top_up(&client.id, &gateway.id, bad, "bad")
                .await
                .unwrap_err();
            assert!(err.is_invalid_amount(), "unexpected error: {err}");
        }

        assert_eq!(ledger.get_account_balance(&client.id).await.unwrap(), dec!(10));
        assert_eq!(ledger.get_account_balance(&gateway.id).await.unwrap(), dec!(0));
        assert_eq!(journal_len(&ctx).await, 0);
    }

    #[tokio::test]
    async fn test_missing_account_leaves_no_trace() {
        let (_dir, ctx) = setup().await;
        let ledger = LedgerService::new(&ctx);
        let gateway = ledger
            .create_account(AccountType::GatewayAsset, dec!(0), "Gateway")
            .await
            .unwrap();

        let err = ledger
            .client_account_top_up(&AccountId::new(), &gateway.id, dec!(10), "t1")
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(ledger.get_account_balance(&gateway.id).await.unwrap(), dec!(0));
        assert_eq!(journal_len(&ctx).await, 0);
    }

    #[tokio::test]
    async fn test_failed_append_rolls_back_both_legs() {
        let (_dir, ctx) = setup().await;
        sqlx::query(
            r#"
            CREATE TRIGGER reject_boom BEFORE INSERT ON journal_entries
            WHEN NEW.tranref = 'boom'
            BEGIN
                SELECT RAISE(ABORT, 'injected');
            END;
            "#,
        )
        .execute(ctx.pool())
        .await
        .unwrap();

        let ledger = LedgerService::new(&ctx);
        let client = ledger
            .create_account(AccountType::ClientLiability, dec!(0), "Client")
            .await
            .unwrap();
        let gateway = ledger
            .create_account(AccountType::GatewayAsset, dec!(0), "Gateway")
            .await
            .unwrap();

        let err = ledger
            .client_account_top_up(&client.id, &gateway.id, dec!(250), "boom")
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::Persistence(_)), "unexpected error: {err}");
        assert_eq!(ledger.get_account_balance(&client.id).await.unwrap(), dec!(0));
        assert_eq!(ledger.get_account_balance(&gateway.id).await.unwrap(), dec!(0));
        assert_eq!(journal_len(&ctx).await, 0);

        // the store is still usable afterwards
        ledger
            .client_account_top_up(&client.id, &gateway.id, dec!(250), "ok")
            .await
            .unwrap();
        assert_eq!(ledger.get_account_balance(&client.id).await.unwrap(), dec!(250));
    }

    #[tokio::test]
    async fn test_roles_not_checked_by_default() {
        let (_dir, ctx) = setup().await;
        let ledger = LedgerService::new(&ctx);
        let agent = ledger
            .create_account(AccountType::AgentEarned, dec!(0), "Agent")
            .await
            .unwrap();
        let other_agent = ledger
            .create_account(AccountType::AgentEarned, dec!(0), "Other agent")
            .await
            .unwrap();

        ledger
            .client_account_top_up(&agent.id, &other_agent.id, dec!(5), "t1")
            .await
            .unwrap();
        assert_eq!(ledger.get_account_balance(&agent.id).await.unwrap(), dec!(5));
    }

    #[tokio::test]
    async fn test_roles_enforced_when_enabled() {
        let config = LedgerConfig {
            enforce_account_roles: true,
            ..LedgerConfig::default()
        };
        let (_dir, ctx) = setup_with(config).await;
        let ledger = LedgerService::new(&ctx);
        let client = ledger
            .create_account(AccountType::ClientLiability, dec!(100), "Client")
            .await
            .unwrap();
        let gateway = ledger
            .create_account(AccountType::GatewayAsset, dec!(0), "Gateway")
            .await
            .unwrap();
        let agent = ledger
            .create_account(AccountType::AgentEarned, dec!(0), "Agent")
            .await
            .unwrap();

        // premium paid to an agent instead of an underwriter
        let err = ledger
            .client_premium_payment(&client.id, &agent.id, dec!(50), "p1")
            .await
            .unwrap_err();
        match err {
            LedgerError::RoleMismatch {
                account,
                expected,
                actual,
            } => {
                assert_eq!(account, agent.id);
                assert_eq!(expected, AccountType::UnderwriterPayable);
                assert_eq!(actual, AccountType::AgentEarned);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ledger.get_account_balance(&client.id).await.unwrap(), dec!(100));
        assert_eq!(journal_len(&ctx).await, 0);

        // correct roles still post
        ledger
            .client_account_top_up(&client.id, &gateway.id, dec!(1), "t1")
            .await
            .unwrap();
        assert_eq!(ledger.get_account_balance(&client.id).await.unwrap(), dec!(101));
    }

    #[tokio::test]
    async fn test_journal_paging() {
        let (_dir, ctx) = setup().await;
        let ledger = LedgerService::new(&ctx);
        let client = ledger
            .create_account(AccountType::ClientLiability, dec!(0), "Client")
            .await
            .unwrap();
        let gateway = ledger
            .create_account(AccountType::GatewayAsset, dec!(0), "Gateway")
            .await
            .unwrap();

        for i in 1..=3 {
            ledger
                .client_account_top_up(&client.id, &gateway.id, Decimal::from(i), &format!("t{i}"))
                .await
                .unwrap();
        }

        let all = ledger.get_journal_entries(0, -10).await.unwrap();
        let refs: Vec<_> = all.iter().map(|e| e.tranref.as_str()).collect();
        assert_eq!(refs, vec!["t3", "t2", "t1"]);

        let page = ledger.get_journal_entries(2, 1).await.unwrap();
        let refs: Vec<_> = page.iter().map(|e| e.tranref.as_str()).collect();
        assert_eq!(refs, vec!["t2", "t1"]);

        assert!(ledger.get_journal_entries(10, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_and_get_accounts() {
        let (_dir, ctx) = setup().await;
        let ledger = LedgerService::new(&ctx);
        let created = ledger
            .create_account(AccountType::UnderwriterPayable, dec!(-20.5), "Underwriter")
            .await
            .unwrap();

        let loaded = ledger.get_account_by_id(&created.id).await.unwrap();
        assert_eq!(loaded, created);
        assert_eq!(ledger.list_accounts().await.unwrap(), vec![created]);

        let err = ledger.get_account_by_id(&AccountId::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
