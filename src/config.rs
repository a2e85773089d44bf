//! Configuration for the tracker.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration for a tracker instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Base URL of the collection endpoint
    pub endpoint: String,

    /// HTTP request timeout (in seconds)
    pub request_timeout_secs: u64,

    /// Throttle window for the mouse stream (in milliseconds)
    pub throttle_window_ms: u64,

    /// Mouse samples that force an immediate batch dispatch
    pub flush_threshold: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000".to_string(),
            request_timeout_secs: 10,
            throttle_window_ms: 2000, // 2 seconds
            flush_threshold: 256,
        }
    }
}

impl TrackerConfig {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from a specific file, falling back to the
    /// defaults when the file does not exist.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: TrackerConfig = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::config_path())
    }

    /// Save configuration to a specific file.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("beacon-analytics")
            .join("config.json")
    }

    /// The HTTP request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The mouse throttle window as a duration.
    pub fn throttle_window(&self) -> Duration {
        Duration::from_millis(self.throttle_window_ms)
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_path() -> PathBuf {
        std::env::temp_dir()
            .join("beacon-analytics-test")
            .join(format!("{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_default_config() {
        let config = TrackerConfig::default();
        assert_eq!(config.endpoint, "http://localhost:3000");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.throttle_window(), Duration::from_millis(2000));
        assert_eq!(config.flush_threshold, 256);
    }

    #[test]
    fn test_config_round_trip() {
        let config = TrackerConfig {
            endpoint: "https://collect.example.com".to_string(),
            request_timeout_secs: 5,
            throttle_window_ms: 500,
            flush_threshold: 32,
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: TrackerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.endpoint, config.endpoint);
        assert_eq!(parsed.throttle_window_ms, 500);
        assert_eq!(parsed.flush_threshold, 32);
    }

    #[test]
    fn test_save_and_load_round_trip_on_disk() {
        let path = temp_config_path();
        let config = TrackerConfig {
            endpoint: "https://collect.example.com".to_string(),
            request_timeout_secs: 5,
            throttle_window_ms: 500,
            flush_threshold: 32,
        };

        config.save_to(&path).unwrap();
        let loaded = TrackerConfig::load_from(&path).unwrap();
        assert_eq!(loaded.endpoint, config.endpoint);
        assert_eq!(loaded.throttle_window_ms, 500);
        assert_eq!(loaded.flush_threshold, 32);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let loaded = TrackerConfig::load_from(temp_config_path()).unwrap();
        assert_eq!(loaded.endpoint, "http://localhost:3000");
        assert_eq!(loaded.flush_threshold, 256);
    }

    #[test]
    fn test_load_unparseable_file_is_an_error() {
        let path = temp_config_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        let err = TrackerConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));

        std::fs::remove_file(&path).unwrap();
    }
}
