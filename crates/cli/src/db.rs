//! Database connection and status

use anyhow::{Context, Result};
use premia_config::DatabaseConfig;
use premia_ledger::ServiceContext;
use premia_persistence::{AccountRepo, Database, JournalRepo};
use std::path::Path;

/// Open the ledger database, creating it and applying migrations if needed
pub async fn connect(config: &DatabaseConfig) -> Result<Database> {
    if let Some(parent) = database_file(&config.url).and_then(Path::parent) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    Database::connect(config)
        .await
        .with_context(|| format!("Failed to open database {}", config.url))
}

/// Show database status
pub async fn show_status(ctx: &ServiceContext, url: &str) -> Result<()> {
    let accounts = AccountRepo::count(ctx.pool()).await?;
    let entries = JournalRepo::count(ctx.pool()).await?;

    println!("✅ Ledger ready at {}", url);
    println!("   Accounts:        {}", accounts);
    println!("   Journal entries: {}", entries);
    Ok(())
}

/// File path behind a SQLite URL, `None` for in-memory databases
fn database_file(url: &str) -> Option<&Path> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);

    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(Path::new(path))
    }
}
