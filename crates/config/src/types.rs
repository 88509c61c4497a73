//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiaConfig {
    /// Store configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Posting behaviour
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// SQLite store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite URL (e.g., "sqlite:data/premia.db")
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long SQLite waits on a locked database before reporting busy
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Write-ahead logging (readers never block the writer)
    #[serde(default = "default_true")]
    pub wal: bool,
}

fn default_database_url() -> String {
    "sqlite:data/premia.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

impl DatabaseConfig {
    /// Configuration for a database file at `path`
    pub fn for_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            url: format!("sqlite:{}", path.as_ref().display()),
            ..Self::default()
        }
    }

    /// Busy timeout as a Duration
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            busy_timeout_ms: default_busy_timeout_ms(),
            wal: true,
        }
    }
}

/// Posting behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Extra attempts after a write conflict before giving up
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,

    /// Backoff unit between attempts, multiplied by the attempt number
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Upper bound for a whole posting, all attempts included (none = unbounded)
    #[serde(default)]
    pub posting_timeout_ms: Option<u64>,

    /// Check account types against the operation's debit/credit roles
    #[serde(default)]
    pub enforce_account_roles: bool,
}

fn default_max_conflict_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    10
}

impl LedgerConfig {
    /// Backoff before the given retry attempt (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(u64::from(attempt)))
    }

    /// Posting timeout as a Duration
    pub fn posting_timeout(&self) -> Option<Duration> {
        self.posting_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: default_max_conflict_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            posting_timeout_ms: None,
            enforce_account_roles: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
