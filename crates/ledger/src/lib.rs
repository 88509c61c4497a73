//! # Premia Ledger
//!
//! Ledger layer - double-entry postings for the premium money flow and
//! reconciliation of stored balances against the journal.
//!
//! ```rust,ignore
//! let ctx = ServiceContext::new(&db, config.ledger.clone());
//! let ledger = LedgerService::new(&ctx);
//! ledger.client_account_top_up(&client, &gateway, dec!(1000), "t1").await?;
//!
//! let report = ReconciliationEngine::new(&ctx).reconciliation_report().await?;
//! ```

pub mod error;
pub mod posting;
pub mod reconciliation;
pub mod services;

pub use error::{LedgerError, LedgerResult};
pub use posting::LedgerService;
pub use reconciliation::ReconciliationEngine;
pub use services::{PostingReceipt, ServiceContext};
