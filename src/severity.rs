//! Log severities
//!
//! The ordering of [`Severity`] is load-bearing: every file receives its own
//! severity plus every more severe one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Importance of a log call, from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug = 0,
    Info = 1,
    Error = 2,
    Fatal = 3,
}

impl Severity {
    /// Number of severities
    pub const COUNT: usize = 4;

    /// All severities in ascending order
    pub const ALL: [Severity; Severity::COUNT] = [
        Severity::Debug,
        Severity::Info,
        Severity::Error,
        Severity::Fatal,
    ];

    /// Tag written at the start of every rendered line
    pub fn tag(&self) -> &'static str {
        match self {
            Severity::Debug => "[DEBUG]",
            Severity::Info => "[INFOR]",
            Severity::Error => "[ERROR]",
            Severity::Fatal => "[FATAL]",
        }
    }

    /// Name of the active file for this severity
    pub fn file_name(&self) -> &'static str {
        match self {
            Severity::Debug => "debug.log",
            Severity::Info => "info.log",
            Severity::Error => "error.log",
            Severity::Fatal => "fatal.log",
        }
    }

    /// Lowercase name, as used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// The next less severe level, if any
    pub fn below(&self) -> Option<Severity> {
        match self {
            Severity::Debug => None,
            Severity::Info => Some(Severity::Debug),
            Severity::Error => Some(Severity::Info),
            Severity::Fatal => Some(Severity::Error),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a severity name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity '{0}'")]
pub struct ParseSeverityError(String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Severity::Debug),
            "info" | "infor" => Ok(Severity::Info),
            "error" => Ok(Severity::Error),
            "fatal" => Ok(Severity::Fatal),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Severity::Debug,
            tracing::Level::INFO | tracing::Level::WARN => Severity::Info,
            tracing::Level::ERROR => Severity::Error,
        }
    }
}
