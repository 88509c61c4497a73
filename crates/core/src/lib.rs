//! # Premia Core
//!
//! Core domain types for the premium ledger: accounts, journal entries,
//! positive amounts and reconciliation results.
//!
//! No IO lives here; persistence and orchestration are in `premia-persistence`
//! and `premia-ledger`.

pub mod account;
pub mod amount;
pub mod error;
pub mod journal;
pub mod reconciliation;

pub use account::{Account, AccountId, AccountType};
pub use amount::Amount;
pub use error::{CoreError, CoreResult};
pub use journal::{
    side_totals, EntryId, JournalEntry, Leg, Page, TransactionType, DEFAULT_PAGE_LIMIT,
};
pub use reconciliation::{ReconciliationResult, ReconciliationStatus};
