//! Configuration loader

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::types::PremiaConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Upper bound on conflict retries
const MAX_CONFLICT_RETRIES: u32 = 100;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found
    #[error("config file not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error
    #[error("validation error: {0}")]
    Validation(String),
}

/// Loads and validates the ledger configuration
pub struct ConfigLoader {
    config: Arc<PremiaConfig>,
}

impl ConfigLoader {
    /// Create loader with default configuration
    pub fn new() -> Self {
        Self {
            config: Arc::new(PremiaConfig::default()),
        }
    }

    /// Load configuration from file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let config: PremiaConfig = toml::from_str(&content)?;

        Self::validate(&config)?;
        tracing::debug!(path = %path.display(), "Configuration loaded");

        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Load from file when it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load_file(path) {
            Err(ConfigError::NotFound(missing)) => {
                tracing::debug!(path = %missing, "No config file, using defaults");
                Ok(Self::new())
            }
            other => other,
        }
    }

    /// Load configuration from string
    pub fn load_str(content: &str) -> Result<Self, ConfigError> {
        let config: PremiaConfig = toml::from_str(content)?;
        Self::validate(&config)?;

        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Get current configuration
    #[inline]
    pub fn get(&self) -> Arc<PremiaConfig> {
        Arc::clone(&self.config)
    }

    /// Replace the database URL (command-line override)
    pub fn override_database_url(&mut self, url: &str) -> Result<(), ConfigError> {
        let mut config = (*self.config).clone();
        config.database.url = url.to_string();
        Self::validate(&config)?;
        self.config = Arc::new(config);
        Ok(())
    }

    /// Validate configuration
    fn validate(config: &PremiaConfig) -> Result<(), ConfigError> {
        if config.database.url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database.url must not be empty".to_string(),
            ));
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        if config.ledger.max_conflict_retries > MAX_CONFLICT_RETRIES {
            return Err(ConfigError::Validation(format!(
                "ledger.max_conflict_retries must be at most {}",
                MAX_CONFLICT_RETRIES
            )));
        }

        let level = config.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "unknown logging.level '{}'",
                config.logging.level
            )));
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
