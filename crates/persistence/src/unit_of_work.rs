//! # Unit of Work
//!
//! One atomic store transaction. Either every write made through
//! [`UnitOfWork::conn`] becomes visible on [`UnitOfWork::commit`], or none
//! does.
//!
//! Dropping a unit of work without committing rolls it back, so a cancelled
//! or timed-out caller never leaves partial writes behind.

use crate::error::{PersistenceError, PersistenceResult};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

/// Scoped atomic transaction over the ledger store
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    /// Acquire a connection and open a transaction
    pub async fn begin(pool: &SqlitePool) -> PersistenceResult<Self> {
        let tx = pool.begin().await?;
        Ok(Self { tx })
    }

    /// Connection bound to this transaction
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut *self.tx
    }

    /// Make all writes visible. A failure here means nothing was applied.
    pub async fn commit(self) -> PersistenceResult<()> {
        self.tx.commit().await.map_err(PersistenceError::Commit)
    }

    /// Discard all writes
    pub async fn rollback(self) -> PersistenceResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
