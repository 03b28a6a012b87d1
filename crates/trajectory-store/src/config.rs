//! Configuration for Trajectory.

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding [`TrajectoryConfig::source_dir`]
pub const SOURCE_DIR_ENV: &str = "TRAJECTORY_SOURCE_DIR";

/// Trajectory configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryConfig {
    /// Fixture directory read by the file source
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Account keyword (informational)
    #[serde(default)]
    pub account: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".trajectory")
}

fn default_source_dir() -> PathBuf {
    default_home().join("data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            account: None,
            log_level: default_log_level(),
        }
    }
}

impl TrajectoryConfig {
    /// Path of the user configuration file
    pub fn default_path() -> PathBuf {
        default_home().join("config.yaml")
    }

    /// Load configuration from file, falling back to defaults.
    ///
    /// `TRAJECTORY_SOURCE_DIR` overrides the configured source directory.
    pub fn load() -> Self {
        Self::try_load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load config file");
            Self::default().with_env_overrides()
        })
    }

    /// Like [`load`](Self::load) but fails on an unreadable or invalid file.
    /// A missing file still yields the defaults.
    pub fn try_load() -> Result<Self> {
        let config_path = Self::default_path();
        let config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            Self::default()
        };

        Ok(config.with_env_overrides())
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("{}: {}", path.display(), e)))?;
        serde_yaml::from_str(&content)
            .map_err(|e| StoreError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_source_dir_override(std::env::var_os(SOURCE_DIR_ENV).map(PathBuf::from))
    }

    fn with_source_dir_override(mut self, source_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = source_dir.filter(|d| !d.as_os_str().is_empty()) {
            self.source_dir = dir;
        }
        self
    }
}
