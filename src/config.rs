//! Configuration for the logging engine

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::severity::Severity;

/// Directory used when none is configured
pub const DEFAULT_DIR: &str = "./bin/log/";

/// Retention used when the configured value is out of range
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Inclusive bounds for `retention_days`
pub const MIN_RETENTION_DAYS: u32 = 1;
pub const MAX_RETENTION_DAYS: u32 = 100;

/// Logger configuration
///
/// Values are never rejected. [`Config::normalized`] clamps anything out of
/// range back to its default, and [`crate::Logger`] always normalizes before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the active and rotated files (`~` is expanded)
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Least severe level persisted to files: "info", "error" or "fatal"
    #[serde(default = "default_level")]
    pub level: Severity,

    /// Days of rotated files kept before deletion (1-100, default: 30)
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Echo each call to stdout once, at its own severity
    #[serde(default)]
    pub console: bool,

    /// Caller fragment without the file path: `function:line `
    #[serde(default)]
    pub skip_file_name: bool,

    /// Buffers pre-allocated by the pool (default: 64)
    #[serde(default = "default_pool_floor")]
    pub pool_floor: usize,

    /// Hard cap on buffers the pool will ever allocate (default: 1024)
    #[serde(default = "default_pool_ceiling")]
    pub pool_ceiling: usize,
}

fn default_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DIR)
}

fn default_level() -> Severity {
    Severity::Info
}

fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

fn default_pool_floor() -> usize {
    64
}

fn default_pool_ceiling() -> usize {
    1024
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            level: default_level(),
            retention_days: default_retention_days(),
            console: false,
            skip_file_name: false,
            pool_floor: default_pool_floor(),
            pool_ceiling: default_pool_ceiling(),
        }
    }
}

impl Config {
    /// Config writing to `dir` with every other field at its default
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Clamp every field into its valid range
    ///
    /// `Debug` is never accepted as the persisted minimum; it is coerced to
    /// `Info` like any other out-of-range level.
    pub fn normalized(mut self) -> Self {
        if self.dir.as_os_str().is_empty() {
            self.dir = default_dir();
        }

        if !matches!(
            self.level,
            Severity::Info | Severity::Error | Severity::Fatal
        ) {
            tracing::debug!(level = %self.level, "Coercing minimum level to info");
            self.level = default_level();
        }

        if !(MIN_RETENTION_DAYS..=MAX_RETENTION_DAYS).contains(&self.retention_days) {
            tracing::debug!(
                retention_days = self.retention_days,
                "Retention out of range, using default"
            );
            self.retention_days = default_retention_days();
        }

        if self.pool_ceiling == 0 {
            self.pool_ceiling = default_pool_ceiling();
        }
        if self.pool_floor > self.pool_ceiling {
            self.pool_floor = self.pool_ceiling;
        }

        self
    }

    /// The configured directory with a leading `~` expanded
    pub fn expanded_dir(&self) -> PathBuf {
        let raw = self.dir.to_string_lossy();
        PathBuf::from(shellexpand::tilde(raw.as_ref()).into_owned())
    }
}
