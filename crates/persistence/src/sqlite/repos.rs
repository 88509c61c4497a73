//! Repository implementations for SQLite
//!
//! Account and journal access. Functions take any sqlx executor so the same
//! query runs against the pool or inside a unit of work.

use crate::error::{PersistenceError, PersistenceResult};
use crate::sqlite::schema::*;
use premia_config::DatabaseConfig;
use premia_core::{Account, AccountId, JournalEntry, Page};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};
use std::str::FromStr;

// ============================================================================
// Account Repository
// ============================================================================

/// Repository for accounts table
pub struct AccountRepo;

impl AccountRepo {
    /// Insert a new account
    pub async fn insert<'e, E>(executor: E, account: &Account) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = AccountRow::from(account);
        sqlx::query(
            r#"
            INSERT INTO accounts (id, account_type, balance, opening_balance, name, version, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.account_type)
        .bind(&row.balance)
        .bind(&row.opening_balance)
        .bind(&row.name)
        .bind(row.version)
        .bind(row.created_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Get account by ID
    pub async fn get_by_id<'e, E>(executor: E, id: &AccountId) -> PersistenceResult<Account>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let key = id.to_string();
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE id = ?")
            .bind(&key)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Account", &key))?;
        Account::try_from(row)
    }

    /// Current stored balance
    pub async fn get_balance<'e, E>(executor: E, id: &AccountId) -> PersistenceResult<Decimal>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        Ok(Self::get_by_id(executor, id).await?.balance)
    }

    /// All accounts, oldest first
    pub async fn list_all<'e, E>(executor: E) -> PersistenceResult<Vec<Account>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts ORDER BY created_at, id")
            .fetch_all(executor)
            .await?;
        rows.into_iter().map(Account::try_from).collect()
    }

    /// Add `delta` to the stored balance, returning the new balance.
    ///
    /// Read-modify-write guarded by the row version: the update only applies
    /// if nobody changed the row since it was read, otherwise the call fails
    /// with `VersionConflict` and the enclosing unit of work must be retried.
    /// Only call this inside a unit of work.
    pub async fn increment_balance(
        conn: &mut SqliteConnection,
        id: &AccountId,
        delta: Decimal,
    ) -> PersistenceResult<Decimal> {
        let key = id.to_string();
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE id = ?")
            .bind(&key)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Account", &key))?;

        let current = parse_decimal(&row.balance)?;
        let new_balance = current.checked_add(delta).ok_or_else(|| {
            PersistenceError::InvalidDecimal(format!("balance overflow: {current} + {delta}"))
        })?;

        let result = sqlx::query(
            "UPDATE accounts SET balance = ?, version = version + 1 WHERE id = ? AND version = ?",
        )
        .bind(new_balance.to_string())
        .bind(&key)
        .bind(row.version)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::conflict("Account", &key));
        }

        tracing::trace!(account = %key, %delta, balance = %new_balance, "balance incremented");
        Ok(new_balance)
    }

    /// Count accounts
    pub async fn count<'e, E>(executor: E) -> PersistenceResult<i64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }
}

// ============================================================================
// Journal Repository
// ============================================================================

/// Repository for the append-only journal_entries table
pub struct JournalRepo;

impl JournalRepo {
    /// Append one entry. The table rejects updates and deletes.
    pub async fn append<'e, E>(executor: E, entry: &JournalEntry) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO journal_entries (id, tx_type, amount, tranref, debit_account, credit_account, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.tx_type.as_str())
        .bind(entry.amount.value().to_string())
        .bind(&entry.tranref)
        .bind(entry.debit_account.to_string())
        .bind(entry.credit_account.to_string())
        .bind(entry.created_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Entries sharing a correlation reference, in insertion order
    pub async fn list_by_reference<'e, E>(
        executor: E,
        tranref: &str,
    ) -> PersistenceResult<Vec<JournalEntry>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, JournalEntryRow>(
            "SELECT * FROM journal_entries WHERE tranref = ? ORDER BY seq",
        )
        .bind(tranref)
        .fetch_all(executor)
        .await?;
        Self::into_entries(rows)
    }

    /// Most recent entries first
    pub async fn list_recent<'e, E>(executor: E, page: Page) -> PersistenceResult<Vec<JournalEntry>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, JournalEntryRow>(
            "SELECT * FROM journal_entries ORDER BY created_at DESC, seq DESC LIMIT ? OFFSET ?",
        )
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(executor)
        .await?;
        Self::into_entries(rows)
    }

    /// Entries where the account is on either leg, oldest first
    pub async fn list_for_account<'e, E>(
        executor: E,
        account_id: &AccountId,
    ) -> PersistenceResult<Vec<JournalEntry>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let key = account_id.to_string();
        let rows = sqlx::query_as::<_, JournalEntryRow>(
            r#"
            SELECT * FROM journal_entries
            WHERE debit_account = ? OR credit_account = ?
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(&key)
        .bind(&key)
        .fetch_all(executor)
        .await?;
        Self::into_entries(rows)
    }

    /// Count entries
    pub async fn count<'e, E>(executor: E) -> PersistenceResult<i64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM journal_entries")
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }

    fn into_entries(rows: Vec<JournalEntryRow>) -> PersistenceResult<Vec<JournalEntry>> {
        rows.into_iter().map(JournalEntry::try_from).collect()
    }
}

// ============================================================================
// Database initialization
// ============================================================================

/// Create the connection pool
pub async fn create_pool(config: &DatabaseConfig) -> PersistenceResult<SqlitePool> {
    let mut options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(config.busy_timeout());
    if config.wal {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    // Every connection to an in-memory database gets its own database, so
    // the single connection must never be reaped
    let pool_options = if config.url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(config.max_connections)
    };

    let pool = pool_options.connect_with(options).await?;
    Ok(pool)
}

/// Run migrations
pub async fn run_migrations(pool: &SqlitePool) -> PersistenceResult<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// Create the pool and bring the schema up to date
pub async fn init_database(config: &DatabaseConfig) -> PersistenceResult<SqlitePool> {
    let pool = create_pool(config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
