//! # Configuration State
//!
//! Application configuration, loaded once at startup.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     RESERVA_DB_PATH=/tmp/reserva.db                                    │
//! │     RESERVA_AUTO_SAVE_SECS=10                                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or the platform config dir:                       │
//! │     ~/.config/reserva/reserva.toml (Linux)                             │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! app_name = "Reserva TRIP"
//! storage_key = "reserva-trip-data"
//! auto_save_interval_secs = 30
//! default_section = "dashboard"   # dashboard | ventas
//! currency_symbol = "$"
//! database_path = "/home/me/reserva.db"
//! export_dir = "."
//! ```
//!
//! Values that make no sense (a zero interval, an empty storage key) are
//! replaced by their defaults with a warning rather than failing startup.

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use reserva_core::format::format_currency;
use reserva_core::{Money, APP_VERSION};
use reserva_db::STORAGE_KEY;

use crate::shell::Section;

/// Configuration file and value errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not encode config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("No config path available on this platform")]
    NoConfigPath,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigState {
    /// Name shown in headers and system info.
    pub app_name: String,

    /// Application version. Not read from the file.
    #[serde(skip)]
    pub version: String,

    /// Key the ledger is stored under.
    pub storage_key: String,

    /// Seconds between auto-saves.
    pub auto_save_interval_secs: u64,

    /// Section the interactive session opens on.
    pub default_section: Section,

    /// Prefix for displayed amounts.
    pub currency_symbol: String,

    /// SQLite file. `None` uses the platform data directory.
    pub database_path: Option<PathBuf>,

    /// Where export and report files are written.
    pub export_dir: PathBuf,
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            app_name: "Reserva TRIP".to_string(),
            version: APP_VERSION.to_string(),
            storage_key: STORAGE_KEY.to_string(),
            auto_save_interval_secs: 30,
            default_section: Section::Dashboard,
            currency_symbol: "$".to_string(),
            database_path: None,
            export_dir: PathBuf::from("."),
        }
    }
}

impl ConfigState {
    /// Loads defaults, then the config file (if it exists), then environment
    /// overrides.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = ConfigState::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
                config.version = APP_VERSION.to_string();
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.sanitize();

        Ok(config)
    }

    /// Loads config or returns defaults (with environment overrides) if the
    /// file cannot be read.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            let mut config = ConfigState::default();
            config.apply_overrides(|key| std::env::var(key).ok());
            config.sanitize();
            config
        })
    }

    /// Writes the configuration as TOML.
    pub fn save(&self, config_path: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, toml::to_string_pretty(self)?)?;

        info!(?path, "Config saved");
        Ok(path)
    }

    /// Checks values that the rest of the app relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid("storage_key cannot be empty".into()));
        }
        if self.auto_save_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "auto_save_interval_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Replaces invalid values with defaults, warning for each.
    pub fn sanitize(&mut self) {
        let defaults = ConfigState::default();

        if self.storage_key.trim().is_empty() {
            warn!("Empty storage_key, using '{}'", defaults.storage_key);
            self.storage_key = defaults.storage_key;
        }
        if self.auto_save_interval_secs == 0 {
            warn!(
                "auto_save_interval_secs must be positive, using {}",
                defaults.auto_save_interval_secs
            );
            self.auto_save_interval_secs = defaults.auto_save_interval_secs;
        }
        if self.app_name.trim().is_empty() {
            self.app_name = defaults.app_name;
        }
    }

    /// Applies `RESERVA_*` overrides from `lookup`.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("RESERVA_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = Some(PathBuf::from(path));
        }

        if let Some(key) = lookup("RESERVA_STORAGE_KEY") {
            self.storage_key = key;
        }

        if let Some(secs) = lookup("RESERVA_AUTO_SAVE_SECS") {
            match secs.parse::<u64>() {
                Ok(secs) => self.auto_save_interval_secs = secs,
                Err(_) => warn!(value = %secs, "Ignoring invalid RESERVA_AUTO_SAVE_SECS"),
            }
        }

        if let Some(section) = lookup("RESERVA_DEFAULT_SECTION") {
            match section.parse::<Section>() {
                Ok(section) => self.default_section = section,
                Err(_) => warn!(value = %section, "Ignoring invalid RESERVA_DEFAULT_SECTION"),
            }
        }

        if let Some(symbol) = lookup("RESERVA_CURRENCY_SYMBOL") {
            self.currency_symbol = symbol;
        }

        if let Some(dir) = lookup("RESERVA_EXPORT_DIR") {
            self.export_dir = PathBuf::from(dir);
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "reserva", "trip")
    }

    /// `reserva.toml` in the platform config directory.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("reserva.toml"))
    }

    /// The configured database file, or [`reserva_db::default_database_path`].
    pub fn resolved_database_path(&self) -> PathBuf {
        if let Some(path) = &self.database_path {
            return path.clone();
        }
        reserva_db::default_database_path()
    }

    /// A file name inside the export directory.
    pub fn export_path(&self, file_name: &str) -> PathBuf {
        self.export_dir.join(file_name)
    }

    /// Formats an amount with the configured symbol.
    pub fn format_currency(&self, amount: Money) -> String {
        format_currency(amount, &self.currency_symbol)
    }

    pub fn auto_save_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.auto_save_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("reserva-config-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_defaults() {
        let config = ConfigState::default();
        assert_eq!(config.version, "1.0.0");
        assert_eq!(config.storage_key, "reserva-trip-data");
        assert_eq!(config.auto_save_interval_secs, 30);
        assert_eq!(config.default_section, Section::Dashboard);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_format_currency() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(Money::from_cents(150_000_000)), "$1.500.000");
        assert_eq!(config.format_currency(Money::from_cents(123_456)), "$1.234,56");
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("RESERVA_DB_PATH", "/tmp/x.db"),
            ("RESERVA_AUTO_SAVE_SECS", "5"),
            ("RESERVA_DEFAULT_SECTION", "ventas"),
            ("RESERVA_CURRENCY_SYMBOL", "COP "),
        ]
        .into_iter()
        .collect();

        let mut config = ConfigState::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.resolved_database_path(), PathBuf::from("/tmp/x.db"));
        assert_eq!(config.auto_save_interval_secs, 5);
        assert_eq!(config.default_section, Section::Ventas);
        assert_eq!(config.currency_symbol, "COP ");
    }

    #[test]
    fn test_invalid_override_is_ignored() {
        let mut config = ConfigState::default();
        config.apply_overrides(|k| (k == "RESERVA_AUTO_SAVE_SECS").then(|| "soon".to_string()));
        assert_eq!(config.auto_save_interval_secs, 30);
    }

    #[test]
    fn test_sanitize_restores_defaults() {
        let mut config = ConfigState {
            storage_key: "  ".into(),
            auto_save_interval_secs: 0,
            ..ConfigState::default()
        };
        assert!(config.validate().is_err());

        config.sanitize();
        assert_eq!(config.storage_key, "reserva-trip-data");
        assert_eq!(config.auto_save_interval_secs, 30);
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("roundtrip.toml");
        let config = ConfigState {
            app_name: "Agencia".into(),
            auto_save_interval_secs: 12,
            default_section: Section::Ventas,
            ..ConfigState::default()
        };
        config.save(Some(path.clone())).unwrap();

        let loaded = ConfigState::load(Some(path.clone())).unwrap();
        assert_eq!(loaded.app_name, "Agencia");
        assert_eq!(loaded.default_section, Section::Ventas);
        assert_eq!(loaded.version, APP_VERSION);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_bad_file_falls_back() {
        let path = temp_path("bad.toml");
        std::fs::write(&path, "auto_save_interval_secs = \"soon\"").unwrap();

        assert!(matches!(
            ConfigState::load(Some(path.clone())),
            Err(ConfigError::Parse(_))
        ));
        let config = ConfigState::load_or_default(Some(path.clone()));
        assert_eq!(config.app_name, "Reserva TRIP");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let path = temp_path("partial.toml");
        std::fs::write(&path, "currency_symbol = \"€\"\n").unwrap();

        let config = ConfigState::load(Some(path.clone())).unwrap();
        assert_eq!(config.currency_symbol, "€");
        assert_eq!(config.storage_key, "reserva-trip-data");
        assert_eq!(config.export_path("a.json"), PathBuf::from(".").join("a.json"));

        let _ = std::fs::remove_file(&path);
    }
}
