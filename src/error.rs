//! # Error Types Module
//!
//! Centralized error handling for the discovery tool.
//!
//! ## Error Types
//! - `ConfigError`: Configuration file I/O and parsing errors
//! - `ScanError`: Bluetooth adapter and scan command errors
//!
//! Discovery itself has no error paths: malformed advertisements are filtered,
//! not reported. Both types here are logged at the boundary where they occur
//! and degrade to "no new devices shown".

use std::fmt;
use std::path::PathBuf;

/// Errors raised while reading or writing `config.toml`.
///
/// Every variant carries the file it concerns so the startup warning names it.
#[derive(Debug)]
pub enum ConfigError {
    ReadFailed { path: PathBuf, source: std::io::Error },
    WriteFailed { path: PathBuf, source: std::io::Error },
    ParseFailed { path: PathBuf, source: toml::de::Error },
    SerializeFailed(toml::ser::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ReadFailed { path, source } => {
                write!(f, "Cannot read settings from {}: {}", path.display(), source)
            }
            ConfigError::WriteFailed { path, source } => {
                write!(f, "Cannot write settings to {}: {}", path.display(), source)
            }
            ConfigError::ParseFailed { path, source } => {
                write!(f, "Invalid settings in {}: {}", path.display(), source)
            }
            ConfigError::SerializeFailed(e) => {
                write!(f, "Cannot encode settings: {}", e)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadFailed { source, .. } | ConfigError::WriteFailed { source, .. } => {
                Some(source)
            }
            ConfigError::ParseFailed { source, .. } => Some(source),
            ConfigError::SerializeFailed(e) => Some(e),
        }
    }
}

/// Errors that can occur while driving the Bluetooth adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// Bluetooth manager or runtime initialization failed
    ManagerInit(String),
    /// No Bluetooth adapters available
    NoAdapters,
    /// Start or stop was rejected by the platform
    ScanFailed(String),
    /// The adapter worker thread is no longer running
    WorkerUnavailable,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::ManagerInit(msg) => {
                write!(f, "Failed to initialize Bluetooth manager: {}", msg)
            }
            ScanError::NoAdapters => {
                write!(f, "No Bluetooth adapters found. Please ensure Bluetooth is enabled.")
            }
            ScanError::ScanFailed(msg) => {
                write!(f, "Scan operation failed: {}", msg)
            }
            ScanError::WorkerUnavailable => {
                write!(f, "Bluetooth worker is not running")
            }
        }
    }
}

impl std::error::Error for ScanError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::NoAdapters;
        assert!(err.to_string().contains("Bluetooth"));
        let err = ScanError::ScanFailed("busy".to_string());
        assert_eq!(err.to_string(), "Scan operation failed: busy");
    }

    #[test]
    fn test_config_error_names_file_and_chains_source() {
        use std::error::Error;
        let err = ConfigError::ReadFailed {
            path: PathBuf::from("/tmp/ble-discovery/config.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/tmp/ble-discovery/config.toml"));
        assert!(err.source().is_some());
    }
}
