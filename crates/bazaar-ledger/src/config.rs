//! # Ledger Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Load order (later overrides earlier)                                   │
//! │                                                                         │
//! │  1. Defaults           bazaar.db, 5 connections, 500 bps, "info"        │
//! │  2. bazaar.toml        (or the file named by BAZAAR_CONFIG)             │
//! │  3. Environment        BAZAAR_DB_PATH, BAZAAR_DB_MAX_CONNECTIONS,       │
//! │                        BAZAAR_COMMISSION_BPS, BAZAAR_CLAIM_LEASE_SECS,  │
//! │                        BAZAAR_LOG                                       │
//! │                                                                         │
//! │  → validate() → LedgerConfig                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # bazaar.toml
//! [database]
//! path = "/var/lib/bazaar/bazaar.db"
//! max_connections = 8
//!
//! [ledger]
//! commission_bps = 500   # 5%
//! claim_lease_secs = 300 # after this, an unfinished pass may be resumed
//!
//! [logging]
//! filter = "info,bazaar=debug,sqlx=warn"
//! ```

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use bazaar_core::validation::validate_commission_bps;
use bazaar_core::{CommissionRate, COMMISSION_RATE_BPS};
use bazaar_db::DbConfig;

use crate::error::ConfigError;

/// Default config file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "bazaar.toml";

/// One week.
const MAX_CLAIM_LEASE_SECS: u64 = 7 * 24 * 60 * 60;

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("bazaar.db")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Platform commission in basis points, applied to every vendor.
    #[serde(default = "default_commission_bps")]
    pub commission_bps: u32,

    /// Seconds a recording pass may hold its claim before
    /// `resume_sales_for_order` treats it as abandoned.
    #[serde(default = "default_claim_lease_secs")]
    pub claim_lease_secs: u64,
}

fn default_commission_bps() -> u32 {
    COMMISSION_RATE_BPS
}

fn default_claim_lease_secs() -> u64 {
    300
}

impl Default for LedgerSettings {
    fn default() -> Self {
        LedgerSettings {
            commission_bps: default_commission_bps(),
            claim_lease_secs: default_claim_lease_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive string.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    crate::telemetry::DEFAULT_FILTER.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// LedgerConfig
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub ledger: LedgerSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl LedgerConfig {
    /// Loads from file (if present) and process environment.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = config_path
            .or_else(|| std::env::var("BAZAAR_CONFIG").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = Self::from_file_if_exists(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        info!(
            db_path = %config.database.path.display(),
            commission_bps = config.ledger.commission_bps,
            "Ledger configuration loaded"
        );
        Ok(config)
    }

    fn from_file_if_exists(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        info!(path = %path.display(), "Loading ledger config from file");
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `BAZAAR_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("BAZAAR_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = lookup("BAZAAR_DB_MAX_CONNECTIONS") {
            self.database.max_connections = max
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BAZAAR_DB_MAX_CONNECTIONS".to_string()))?;
        }

        if let Some(bps) = lookup("BAZAAR_COMMISSION_BPS") {
            self.ledger.commission_bps = bps
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BAZAAR_COMMISSION_BPS".to_string()))?;
        }

        if let Some(secs) = lookup("BAZAAR_CLAIM_LEASE_SECS") {
            self.ledger.claim_lease_secs = secs
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BAZAAR_CLAIM_LEASE_SECS".to_string()))?;
        }

        if let Some(filter) = lookup("BAZAAR_LOG") {
            self.logging.filter = filter;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_commission_bps(i64::from(self.ledger.commission_bps))
            .map_err(|_| ConfigError::InvalidValue("ledger.commission_bps".to_string()))?;

        // 1 second to one week.
        if !(1..=MAX_CLAIM_LEASE_SECS).contains(&self.ledger.claim_lease_secs) {
            return Err(ConfigError::InvalidValue("ledger.claim_lease_secs".to_string()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue("database.max_connections".to_string()));
        }

        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue("database.path".to_string()));
        }

        Ok(())
    }

    pub fn commission_rate(&self) -> CommissionRate {
        CommissionRate::from_bps(self.ledger.commission_bps)
    }

    pub fn claim_lease(&self) -> Duration {
        let secs = self.ledger.claim_lease_secs.min(MAX_CLAIM_LEASE_SECS);
        Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX))
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
    }
}
