//! `SessionConfig` (§4.7): aggregates the transport configuration with the
//! dispatch-level settings, loadable from a `dispatchd.toml` file the way
//! the corpus's `openintent-agent::config` loads `GatewayConfig` -- read the
//! file if present, fall back to defaults with a warning if not, and parse
//! with `toml::from_str`.

use std::path::Path;

use dispatch_transport::TransportConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CoordinatorError, Result};

/// Aggregate configuration for one [`crate::Coordinator`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Worker-facing transport configuration.
    pub transport: TransportConfig,
    /// Per-task timeout, in seconds.
    pub timeout_seconds: u64,
    /// Default `chunk_size` for calls that don't override it.
    pub chunk_size: usize,
    /// Optional retry cap (see the `max_attempts` REDESIGN FLAG). `None`
    /// preserves unbounded retries.
    pub max_attempts: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            timeout_seconds: 60,
            chunk_size: 1,
            max_attempts: None,
        }
    }
}

impl SessionConfig {
    /// Load configuration from a TOML file. Missing files fall back to
    /// [`SessionConfig::default`] with a warning, matching the corpus's
    /// `load_from_file` tolerance for a not-yet-created config.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| CoordinatorError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;

        let config = toml::from_str(&content).map_err(|source| CoordinatorError::ConfigParse {
            path: path.display().to_string(),
            source,
        })?;

        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_specification() {
        let config = SessionConfig::default();
        assert_eq!(config.timeout_seconds, 60);
        assert_eq!(config.chunk_size, 1);
        assert_eq!(config.max_attempts, None);
        assert_eq!(config.transport.transport_port, 7700);
        assert_eq!(config.transport.asset_port, 7701);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = SessionConfig::from_file("/nonexistent/dispatchd.toml").unwrap();
        assert_eq!(config.chunk_size, 1);
    }

    #[test]
    fn loads_overrides_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dispatchd.toml");
        std::fs::write(
            &path,
            r#"
            timeout_seconds = 30
            chunk_size = 4

            [transport]
            transport_port = 9100
            asset_port = 9101
            packages = ["numpy"]
            "#,
        )
        .unwrap();

        let config = SessionConfig::from_file(&path).unwrap();
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.chunk_size, 4);
        assert_eq!(config.transport.transport_port, 9100);
        assert_eq!(config.transport.packages, vec!["numpy".to_string()]);
    }
}
