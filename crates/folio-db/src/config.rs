//! # Engine Configuration
//!
//! Configuration for the database and the issuance orchestrator.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     FOLIO_DB_PATH=/var/lib/folio/folio.db                              │
//! │     FOLIO_WALK_IN_CUSTOMER_ID=...                                      │
//! │     FOLIO_MAX_CONFLICT_RETRIES=8                                       │
//! │     FOLIO_STRICT_INVENTORY=true                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/folio-pos/folio.toml (Linux)                             │
//! │     ~/Library/Application Support/com.folio.pos/folio.toml (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/var/lib/folio/folio.db"
//! max_connections = 5
//! busy_timeout_ms = 5000
//!
//! [issuance]
//! walk_in_customer_id = "00000000-0000-0000-0000-000000000001"
//! max_conflict_retries = 5
//! initial_backoff_ms = 10
//! max_backoff_ms = 500
//! strict_inventory = false
//! ```

use backoff::ExponentialBackoff;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use folio_core::WALK_IN_CUSTOMER_ID;

use crate::pool::DbConfig;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No config path available")]
    NoPath,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Database Settings
// =============================================================================

/// `[database]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file path.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a writer waits on another writer's lock (milliseconds).
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}

fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("com", "folio", "pos")
        .map(|dirs| dirs.data_dir().join("folio.db"))
        .unwrap_or_else(|| PathBuf::from("folio.db"))
}

fn default_max_connections() -> u32 {
    5
}

fn default_busy_timeout() -> u64 {
    5000
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

impl DatabaseSettings {
    /// Pool configuration for these settings.
    pub fn to_db_config(&self) -> DbConfig {
        DbConfig::new(self.path.clone())
            .max_connections(self.max_connections)
            .busy_timeout(Duration::from_millis(self.busy_timeout_ms))
    }
}

// =============================================================================
// Issuance Settings
// =============================================================================

/// `[issuance]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuanceSettings {
    /// The generic customer that may buy but never on credit.
    #[serde(default = "default_walk_in_customer")]
    pub walk_in_customer_id: String,

    /// Attempts after the first one when a numbering conflict is detected.
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,

    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,

    /// Reject an issuance that sells a product missing from the catalog
    /// instead of skipping its stock decrement.
    #[serde(default)]
    pub strict_inventory: bool,
}

fn default_walk_in_customer() -> String {
    WALK_IN_CUSTOMER_ID.to_string()
}

fn default_max_conflict_retries() -> u32 {
    5
}

fn default_initial_backoff() -> u64 {
    10
}

fn default_max_backoff() -> u64 {
    500
}

impl Default for IssuanceSettings {
    fn default() -> Self {
        IssuanceSettings {
            walk_in_customer_id: default_walk_in_customer(),
            max_conflict_retries: default_max_conflict_retries(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            strict_inventory: false,
        }
    }
}

impl IssuanceSettings {
    /// Sets the conflict retry bound.
    pub fn max_conflict_retries(mut self, retries: u32) -> Self {
        self.max_conflict_retries = retries;
        self
    }

    /// Sets strict inventory mode.
    pub fn strict_inventory(mut self, strict: bool) -> Self {
        self.strict_inventory = strict;
        self
    }

    /// Fresh backoff schedule for one issuance.
    ///
    /// Unbounded in time; the retry count bounds it.
    pub fn backoff(&self) -> ExponentialBackoff {
        let initial = Duration::from_millis(self.initial_backoff_ms);
        ExponentialBackoff {
            current_interval: initial,
            initial_interval: initial,
            max_interval: Duration::from_millis(self.max_backoff_ms),
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolioConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub issuance: IssuanceSettings,
}

impl FolioConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (folio.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading folio config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load folio config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Folio config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if uuid::Uuid::parse_str(&self.issuance.walk_in_customer_id).is_err() {
            return Err(ConfigError::Invalid(format!(
                "issuance.walk_in_customer_id must be a UUID, got: {}",
                self.issuance.walk_in_customer_id
            )));
        }

        if self.issuance.initial_backoff_ms > self.issuance.max_backoff_ms {
            return Err(ConfigError::Invalid(
                "issuance.initial_backoff_ms must not exceed max_backoff_ms".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("FOLIO_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(id) = lookup("FOLIO_WALK_IN_CUSTOMER_ID") {
            self.issuance.walk_in_customer_id = id;
        }

        if let Some(retries) = lookup("FOLIO_MAX_CONFLICT_RETRIES") {
            match retries.parse::<u32>() {
                Ok(r) => self.issuance.max_conflict_retries = r,
                Err(_) => warn!(value = %retries, "Ignoring invalid FOLIO_MAX_CONFLICT_RETRIES"),
            }
        }

        if let Some(strict) = lookup("FOLIO_STRICT_INVENTORY") {
            match strict.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.issuance.strict_inventory = true,
                "0" | "false" | "no" => self.issuance.strict_inventory = false,
                _ => warn!(value = %strict, "Unknown FOLIO_STRICT_INVENTORY value"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "folio", "pos")
            .map(|dirs| dirs.config_dir().join("folio.toml"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
