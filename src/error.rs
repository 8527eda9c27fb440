//! Errors surfaced while constructing a logger
//!
//! Only construction can fail. Once a [`crate::Logger`] exists, write,
//! rotation and retention failures are absorbed and never reach the caller.

use std::io;
use std::path::PathBuf;

/// Failure to establish a writable destination
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to create log directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open log file {}: {source}", .path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LogError {
    /// Path the failing operation was applied to
    pub fn path(&self) -> &PathBuf {
        match self {
            LogError::CreateDir { path, .. } | LogError::OpenFile { path, .. } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, LogError>;
