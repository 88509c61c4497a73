//! # Premia Persistence
//!
//! Persistence layer for the ledger - SQLite account store and append-only
//! journal, plus the unit of work used for atomic postings.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Database                          │
//! │  ┌─────────────┐   ┌──────────────┐   ┌───────────────┐  │
//! │  │ AccountRepo │   │ JournalRepo  │   │  UnitOfWork   │  │
//! │  │ (balances)  │   │ (append-only)│   │ (transaction) │  │
//! │  └─────────────┘   └──────────────┘   └───────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use premia_persistence::{AccountRepo, Database, JournalRepo};
//!
//! let db = Database::connect(&config.database).await?;
//!
//! let mut uow = db.begin().await?;
//! AccountRepo::increment_balance(uow.conn(), &debit, -amount).await?;
//! AccountRepo::increment_balance(uow.conn(), &credit, amount).await?;
//! JournalRepo::append(uow.conn(), &entry).await?;
//! uow.commit().await?;
//! ```

pub mod error;
pub mod sqlite;
pub mod unit_of_work;

pub use error::{PersistenceError, PersistenceResult};
pub use sqlite::schema::{AccountRow, JournalEntryRow};
pub use sqlite::{create_pool, init_database, run_migrations, AccountRepo, JournalRepo};
pub use unit_of_work::UnitOfWork;

use premia_config::DatabaseConfig;
use sqlx::SqlitePool;

/// Database facade - pool plus schema management
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and run migrations
    pub async fn connect(config: &DatabaseConfig) -> PersistenceResult<Self> {
        let pool = init_database(config).await?;
        tracing::debug!(url = %config.url, "Database ready");
        Ok(Self { pool })
    }

    /// Get SQLite connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Open a unit of work
    pub async fn begin(&self) -> PersistenceResult<UnitOfWork> {
        UnitOfWork::begin(&self.pool).await
    }

    /// Close all connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use premia_core::{Account, AccountId, AccountType, Amount, JournalEntry, Page, TransactionType};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let config = DatabaseConfig::for_path(dir.path().join("ledger.db"));
        let db = Database::connect(&config).await.unwrap();
        (dir, db)
    }

    async fn account(db: &Database, account_type: AccountType, balance: Decimal) -> Account {
        let account = Account::new(account_type, balance, account_type.as_str());
        AccountRepo::insert(db.pool(), &account).await.unwrap();
        account
    }

    fn entry(tranref: &str, value: Decimal, dr: &Account, cr: &Account) -> JournalEntry {
        JournalEntry::new(TransactionType::TopUp, Amount::new(value).unwrap(), dr.id, cr.id, tranref)
    }

    #[tokio::test]
    async fn test_account_insert_and_get() {
        let (_dir, db) = setup().await;
        let created = account(&db, AccountType::ClientLiability, dec!(1500.25)).await;

        let loaded = AccountRepo::get_by_id(db.pool(), &created.id).await.unwrap();
        assert_eq!(loaded.balance, dec!(1500.25));
        assert_eq!(loaded.opening_balance, dec!(1500.25));
        assert_eq!(loaded.account_type, AccountType::ClientLiability);

        let balance = AccountRepo::get_balance(db.pool(), &created.id).await.unwrap();
        assert_eq!(balance, dec!(1500.25));
    }

    #[tokio::test]
    async fn test_get_missing_account() {
        let (_dir, db) = setup().await;
        let err = AccountRepo::get_by_id(db.pool(), &AccountId::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_increment_balance_bumps_version() {
        let (_dir, db) = setup().await;
        let client = account(&db, AccountType::ClientLiability, dec!(0)).await;

        let mut uow = db.begin().await.unwrap();
        let after_credit = AccountRepo::increment_balance(uow.conn(), &client.id, dec!(1000))
            .await
            .unwrap();
        let after_debit = AccountRepo::increment_balance(uow.conn(), &client.id, dec!(-0.01))
            .await
            .unwrap();
        uow.commit().await.unwrap();

        assert_eq!(after_credit, dec!(1000));
        assert_eq!(after_debit, dec!(999.99));

        let (version,): (i64,) = sqlx::query_as("SELECT version FROM accounts WHERE id = ?")
            .bind(client.id.to_string())
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(version, 2);
        // opening balance is untouched
        let loaded = AccountRepo::get_by_id(db.pool(), &client.id).await.unwrap();
        assert_eq!(loaded.opening_balance, dec!(0));
    }

    #[tokio::test]
    async fn test_increment_missing_account() {
        let (_dir, db) = setup().await;
        let mut uow = db.begin().await.unwrap();
        let err = AccountRepo::increment_balance(uow.conn(), &AccountId::new(), dec!(1))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_journal_listings() {
        let (_dir, db) = setup().await;
        let gw = account(&db, AccountType::GatewayAsset, dec!(0)).await;
        let cl = account(&db, AccountType::ClientLiability, dec!(0)).await;
        let other = account(&db, AccountType::AgentEarned, dec!(0)).await;

        let first = entry("t1", dec!(10), &gw, &cl);
        let second = entry("t1", dec!(20), &cl, &other);
        let third = entry("t2", dec!(30), &gw, &other);
        for e in [&first, &second, &third] {
            JournalRepo::append(db.pool(), e).await.unwrap();
        }

        let by_ref = JournalRepo::list_by_reference(db.pool(), "t1").await.unwrap();
        assert_eq!(by_ref, vec![first.clone(), second.clone()]);
        assert!(JournalRepo::list_by_reference(db.pool(), "nope").await.unwrap().is_empty());

        let recent = JournalRepo::list_recent(db.pool(), Page::new(0, -1)).await.unwrap();
        assert_eq!(recent, vec![third.clone(), second.clone(), first.clone()]);

        let paged = JournalRepo::list_recent(db.pool(), Page::new(1, 1)).await.unwrap();
        assert_eq!(paged, vec![second.clone()]);

        let for_client = JournalRepo::list_for_account(db.pool(), &cl.id).await.unwrap();
        assert_eq!(for_client, vec![first, second]);

        assert_eq!(JournalRepo::count(db.pool()).await.unwrap(), 3);
        assert_eq!(AccountRepo::count(db.pool()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_journal_is_append_only() {
        let (_dir, db) = setup().await;
        let gw = account(&db, AccountType::GatewayAsset, dec!(0)).await;
        let cl = account(&db, AccountType::ClientLiability, dec!(0)).await;
        let e = entry("t1", dec!(10), &gw, &cl);
        JournalRepo::append(db.pool(), &e).await.unwrap();

        let update = sqlx::query("UPDATE journal_entries SET amount = '11' WHERE id = ?")
            .bind(e.id.to_string())
            .execute(db.pool())
            .await;
        assert!(update.is_err());

        let delete = sqlx::query("DELETE FROM journal_entries")
            .execute(db.pool())
            .await;
        assert!(delete.is_err());

        let delete_account = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(gw.id.to_string())
            .execute(db.pool())
            .await;
        assert!(delete_account.is_err());

        let stored = JournalRepo::list_by_reference(db.pool(), "t1").await.unwrap();
        assert_eq!(stored, vec![e]);
    }

    #[tokio::test]
    async fn test_journal_requires_existing_accounts() {
        let (_dir, db) = setup().await;
        let gw = account(&db, AccountType::GatewayAsset, dec!(0)).await;
        let ghost = Account::new(AccountType::ClientLiability, dec!(0), "ghost");

        let result = JournalRepo::append(db.pool(), &entry("t1", dec!(1), &gw, &ghost)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_in_memory_pool_keeps_its_connection() {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..DatabaseConfig::default()
        };
        let db = Database::connect(&config).await.unwrap();

        let options = db.pool().options();
        assert_eq!(options.get_max_connections(), 1);
        assert_eq!(options.get_idle_timeout(), None);
        assert_eq!(options.get_max_lifetime(), None);

        // schema and rows survive across acquisitions
        let created = account(&db, AccountType::GatewayAsset, dec!(3)).await;
        let loaded = AccountRepo::get_by_id(db.pool(), &created.id).await.unwrap();
        assert_eq!(loaded.balance, dec!(3));
    }

    #[tokio::test]
    async fn test_list_all_accounts() {
        let (_dir, db) = setup().await;
        let a = account(&db, AccountType::GatewayAsset, dec!(0)).await;
        let b = account(&db, AccountType::UnderwriterPayable, dec!(5)).await;

        let all = AccountRepo::list_all(db.pool()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|acc| acc.id == a.id));
        assert!(all.iter().any(|acc| acc.id == b.id));
    }
}
