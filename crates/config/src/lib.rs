//! Premia Config - Configuration management
//!
//! TOML file with serde defaults for every field, validated on load.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod loader;
pub mod types;

pub use loader::{ConfigError, ConfigLoader};
pub use types::{DatabaseConfig, LedgerConfig, LoggingConfig, PremiaConfig};
