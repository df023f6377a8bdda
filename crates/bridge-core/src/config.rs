// Tone Bridge Core - Runtime configuration
//
// Example:
// ```yaml
// store:
//   max_entries: 1000
//   default_ttl_minutes: 60
//   cleanup_interval_secs: 300
//   safety_mode: true
// sessions:
//   idle_timeout_minutes: 15
//   session_ttl_minutes: 120
// ```
//
// Every field is optional; missing fields take the documented defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{BridgeError, BridgeResult};

/// Top-level configuration for a mediator instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub store: StoreConfig,
    pub sessions: SessionConfig,
}

/// Context store limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Entry count above which priority eviction kicks in
    pub max_entries: usize,
    /// TTL applied when a put does not specify one
    pub default_ttl_minutes: u64,
    /// Period of the background sweep
    pub cleanup_interval_secs: u64,
    /// Scan producer payloads before they are stored
    pub safety_mode: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_ttl_minutes: 60,
            cleanup_interval_secs: 300,
            safety_mode: true,
        }
    }
}

/// Longest representable TTL (100 years)
pub const MAX_TTL_MINUTES: u64 = 60 * 24 * 365 * 100;

/// Minutes as a chrono duration, clamped to [`MAX_TTL_MINUTES`]
pub fn minutes(value: u64) -> chrono::Duration {
    chrono::Duration::minutes(value.min(MAX_TTL_MINUTES) as i64)
}

impl StoreConfig {
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    pub fn default_ttl(&self) -> chrono::Duration {
        minutes(self.default_ttl_minutes)
    }
}

/// Session lifecycle timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Inactivity after which an active session turns idle
    pub idle_timeout_minutes: u64,
    /// Inactivity after which a session expires
    pub session_ttl_minutes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: 15,
            session_ttl_minutes: 120,
        }
    }
}

impl BridgeConfig {
    /// Parse from YAML; errors name the offending field path
    pub fn from_yaml_str(yaml: &str) -> BridgeResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let de = serde_yaml::Deserializer::from_str(yaml);
        let config: Self = serde_path_to_error::deserialize(de).map_err(|e| {
            BridgeError::config(format!("Invalid config at '{}': {}", e.path(), e.inner()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        tracing::debug!("Loaded bridge config from {}", path.display());
        Self::from_yaml_str(&content)
    }

    /// Reject settings the store and session manager cannot honor
    pub fn validate(&self) -> BridgeResult<()> {
        if self.store.max_entries == 0 {
            return Err(BridgeError::config("store.max_entries must be greater than 0"));
        }
        if self.store.cleanup_interval_secs == 0 {
            return Err(BridgeError::config(
                "store.cleanup_interval_secs must be greater than 0",
            ));
        }
        if self.store.default_ttl_minutes == 0 {
            return Err(BridgeError::config(
                "store.default_ttl_minutes must be greater than 0",
            ));
        }
        if self.sessions.idle_timeout_minutes >= self.sessions.session_ttl_minutes {
            return Err(BridgeError::config(format!(
                "sessions.idle_timeout_minutes ({}) must be less than sessions.session_ttl_minutes ({})",
                self.sessions.idle_timeout_minutes, self.sessions.session_ttl_minutes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.store.max_entries, 1000);
        assert_eq!(config.store.default_ttl_minutes, 60);
        assert!(config.store.safety_mode);
        assert_eq!(config.sessions.idle_timeout_minutes, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = BridgeConfig::from_yaml_str("store:\n  max_entries: 5\n").unwrap();
        assert_eq!(config.store.max_entries, 5);
        assert_eq!(config.store.cleanup_interval_secs, 300);
        assert_eq!(config.sessions, SessionConfig::default());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(BridgeConfig::from_yaml_str("").unwrap(), BridgeConfig::default());
    }

    #[test]
    fn test_error_names_field_path() {
        let err = BridgeConfig::from_yaml_str("store:\n  max_entries: lots\n").unwrap_err();
        assert!(err.to_string().contains("store.max_entries"), "{}", err);
    }

    #[test]
    fn test_validation_rejects_zero_capacity() {
        let err = BridgeConfig::from_yaml_str("store:\n  max_entries: 0\n").unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }

    #[test]
    fn test_validation_rejects_idle_after_ttl() {
        let yaml = "sessions:\n  idle_timeout_minutes: 30\n  session_ttl_minutes: 10\n";
        assert!(BridgeConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "store:\n  safety_mode: false\n  default_ttl_minutes: 5").unwrap();

        let config = BridgeConfig::from_yaml_file(file.path()).unwrap();
        assert!(!config.store.safety_mode);
        assert_eq!(config.store.default_ttl_minutes, 5);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = BridgeConfig::from_yaml_file("/nonexistent/bridge.yaml").unwrap_err();
        assert!(matches!(err, BridgeError::Io(_)));
    }
}
