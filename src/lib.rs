//! levelog - leveled file logging for long-running processes
//!
//! Log calls at four severities are rendered with a `?` placeholder syntax
//! and written to one file per severity. Every file also receives the lines
//! of all more severe levels, files are rotated at local midnight, and
//! rotated files older than the retention window are deleted.
//!
//! ```no_run
//! use std::sync::Arc;
//! use levelog::{Config, Logger};
//!
//! let logger = Arc::new(Logger::new(Config::with_dir("./logs")).unwrap());
//! logger.info("user ? logged in from ?", &[&42, &"10.0.0.1"]);
//! levelog::error!(logger, "payment ? declined", "p-17");
//! ```

pub mod bridge;
pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod logger;
mod macros;
pub mod pool;
pub mod retention;
pub mod severity;
pub mod value;
pub mod writer;

pub use bridge::LevelogLayer;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::LogError;
pub use format::Caller;
pub use logger::{Logger, LoggerBuilder, FATAL_EXIT_CODE};
pub use pool::{BufferPool, PooledBuffer};
pub use severity::Severity;
pub use value::{LogValue, Shown};
pub use writer::{ConsoleSink, LevelWriter};
