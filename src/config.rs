//! # Configuration Management Module
//!
//! Persistent settings stored in platform-appropriate locations.
//! Handles loading, saving, and providing defaults for configuration options.
//!
//! ## Settings
//! - `scan_on_start`: Turn the scan toggle on as soon as the tool starts
//! - `reset_device_counter_each_session`: Restart `Device N` numbering with every scan session
//! - `service_filter`: Only report devices advertising one of these service UUIDs
//! - `log_level`: Default log filter when `RUST_LOG` is not set
//!
//! ## Storage Location
//! - macOS: ~/Library/Application Support/ble-discovery/config.toml
//! - Linux: ~/.config/ble-discovery/config.toml
//! - Windows: %APPDATA%\ble-discovery\config.toml

use crate::error::ConfigError;
use crate::label::CounterPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan_on_start: bool,
    pub reset_device_counter_each_session: bool,
    pub service_filter: Vec<String>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_on_start: true,
            reset_device_counter_each_session: false,
            service_filter: Vec::new(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ble-discovery")
            .join("config.toml")
    }

    /// Load config from the platform location, creating it with defaults if missing
    pub fn load() -> Result<Self, ConfigError> {
        match Self::read(&Self::config_path())? {
            Some(config) => Ok(config),
            None => {
                let config = Self::default();
                config.save()?;
                Ok(config)
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match Self::read(path)? {
            Some(config) => Ok(config),
            None => {
                let config = Self::default();
                config.save_to(path)?;
                Ok(config)
            }
        }
    }

    /// Save config to the platform location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_failed = |source| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_failed)?;
        }

        let toml_string = toml::to_string_pretty(self).map_err(ConfigError::SerializeFailed)?;
        fs::write(path, toml_string).map_err(write_failed)
    }

    /// `Ok(None)` when the file does not exist yet.
    fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)
                .map(Some)
                .map_err(|source| ConfigError::ParseFailed {
                    path: path.to_path_buf(),
                    source,
                }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::ReadFailed {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn counter_policy(&self) -> CounterPolicy {
        if self.reset_device_counter_each_session {
            CounterPolicy::PerSession
        } else {
            CounterPolicy::PerProcess
        }
    }

    /// Parsed service filter. Entries that are not UUIDs are logged and skipped.
    pub fn service_uuids(&self) -> Vec<Uuid> {
        self.service_filter
            .iter()
            .filter_map(|raw| match Uuid::parse_str(raw.trim()) {
                Ok(uuid) => Some(uuid),
                Err(e) => {
                    log::warn!("Ignoring invalid service filter '{}': {}", raw, e);
                    None
                }
            })
            .collect()
    }
}
