//! SQLite persistence module
//!
//! Repository pattern for SQLite database access.

pub mod repos;
pub mod schema;

pub use repos::{create_pool, init_database, run_migrations, AccountRepo, JournalRepo};
pub use schema::{AccountRow, JournalEntryRow};
