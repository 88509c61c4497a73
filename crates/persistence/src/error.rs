//! # Persistence Errors
//!
//! Error types for the persistence layer, wrapping sqlx errors.

use thiserror::Error;

/// SQLite primary result codes that signal a write conflict
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    // === Database errors ===
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Concurrent modification of {entity} {id}")]
    VersionConflict { entity: String, id: String },

    #[error("Commit failed: {0}")]
    Commit(sqlx::Error),

    // === Conversion errors ===
    #[error("Invalid decimal value: {0}")]
    InvalidDecimal(String),

    #[error("Invalid enum value: {field} = {value}")]
    InvalidEnumValue { field: String, value: String },

    #[error("Invalid id: {0}")]
    InvalidId(String),
}

/// Result type alias for PersistenceError
pub type PersistenceResult<T> = Result<T, PersistenceError>;

impl PersistenceError {
    /// Create NotFound error
    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Create VersionConflict error
    pub fn conflict(entity: &str, id: &str) -> Self {
        Self::VersionConflict {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Create InvalidEnumValue error
    pub fn invalid_enum(field: &str, value: &str) -> Self {
        Self::InvalidEnumValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether retrying the whole unit of work may succeed.
    ///
    /// True for optimistic version conflicts and for SQLite busy/locked
    /// results (including `SQLITE_BUSY_SNAPSHOT` in WAL mode).
    pub fn is_conflict(&self) -> bool {
        match self {
            Self::VersionConflict { .. } => true,
            Self::Database(err) | Self::Commit(err) => is_busy(err),
            _ => false,
        }
    }
}

fn is_busy(err: &sqlx::Error) -> bool {
    let sqlx::Error::Database(db_err) = err else {
        return false;
    };

    let primary = db_err
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        .map(|code| code & 0xff);

    match primary {
        Some(code) => code == SQLITE_BUSY || code == SQLITE_LOCKED,
        None => db_err.message().contains("database is locked"),
    }
}
