//! The dispatcher: one handle owning a writer per persisted severity
//!
//! A call at severity `L` is rendered once and written to every file from
//! `L` down to the configured minimum, so `info.log` holds every info,
//! error and fatal line. The prefix always names the originating severity.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{LogError, Result};
use crate::format::{self, Caller};
use crate::pool::BufferPool;
use crate::severity::Severity;
use crate::value::LogValue;
use crate::writer::{stdout_sink, ConsoleSink, LevelWriter};

/// Exit status used after a fatal call
pub const FATAL_EXIT_CODE: i32 = 1;

/// A leveled logger writing cascading per-severity files
///
/// Construct once at startup and share it (`Arc<Logger>`) with everything
/// that logs. The writer set is fixed at construction, so dispatching needs
/// no lock beyond each writer's own.
#[derive(Debug)]
pub struct Logger {
    config: Config,
    dir: PathBuf,
    writers: [Option<LevelWriter>; Severity::COUNT],
}

/// Builder for a [`Logger`] with a non-default clock or console
pub struct LoggerBuilder {
    config: Config,
    clock: Arc<dyn Clock>,
    console: ConsoleSink,
}

impl LoggerBuilder {
    /// Use `clock` for timestamps and rotation
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Send console echo to `console` instead of stdout
    pub fn console(mut self, console: ConsoleSink) -> Self {
        self.console = console;
        self
    }

    /// Create the directory and open a writer for every persisted severity
    pub fn build(self) -> Result<Logger> {
        let config = self.config.normalized();
        let dir = config.expanded_dir();

        fs::create_dir_all(&dir).map_err(|source| LogError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let pool = Arc::new(BufferPool::new(config.pool_floor, config.pool_ceiling));
        let mut writers: [Option<LevelWriter>; Severity::COUNT] = [None, None, None, None];
        for severity in Severity::ALL.into_iter().filter(|s| *s >= config.level) {
            writers[severity.index()] = Some(LevelWriter::open(
                severity,
                &dir,
                config.retention_days,
                Arc::clone(&pool),
                Arc::clone(&self.console),
                Arc::clone(&self.clock),
            )?);
        }

        tracing::debug!(
            dir = %dir.display(),
            level = %config.level,
            retention_days = config.retention_days,
            "Logger initialized"
        );

        Ok(Logger {
            config,
            dir,
            writers,
        })
    }
}

impl Logger {
    /// Create a logger using the system clock and stdout
    pub fn new(config: Config) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: Config) -> LoggerBuilder {
        LoggerBuilder {
            config,
            clock: Arc::new(SystemClock),
            console: stdout_sink(),
        }
    }

    /// The configuration in effect, after normalization
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Directory holding the log files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Least severe level that reaches a file
    pub fn min_level(&self) -> Severity {
        self.config.level
    }

    /// Whether a call at `severity` would be written anywhere
    pub fn enabled(&self, severity: Severity) -> bool {
        severity >= self.config.level
    }

    /// Writer for `severity`, if that severity is persisted
    pub fn writer(&self, severity: Severity) -> Option<&LevelWriter> {
        self.writers[severity.index()].as_ref()
    }

    /// Log at debug severity
    ///
    /// The methods record the file and line of the call but cannot see the
    /// enclosing function, which renders as `???`. Use the macros
    /// ([`crate::info!`] and friends) to get the function name as well.
    #[track_caller]
    pub fn debug(&self, format: &str, args: &[&dyn LogValue]) {
        self.dispatch(Severity::Debug, &Caller::here(), format, args);
    }

    /// Log at info severity; the function name renders as `???`
    #[track_caller]
    pub fn info(&self, format: &str, args: &[&dyn LogValue]) {
        self.dispatch(Severity::Info, &Caller::here(), format, args);
    }

    /// Log at error severity; the function name renders as `???`
    #[track_caller]
    pub fn error(&self, format: &str, args: &[&dyn LogValue]) {
        self.dispatch(Severity::Error, &Caller::here(), format, args);
    }

    /// Log at fatal severity, then exit the process with status 1
    #[track_caller]
    pub fn fatal(&self, format: &str, args: &[&dyn LogValue]) -> ! {
        self.fatal_at(&Caller::here(), format, args)
    }

    /// Log at any severity; a fatal call exits the process
    #[track_caller]
    pub fn log(&self, severity: Severity, format: &str, args: &[&dyn LogValue]) {
        self.log_at(severity, &Caller::here(), format, args);
    }

    /// Log with an explicit call site, as the macros do
    pub fn log_at(
        &self,
        severity: Severity,
        caller: &Caller,
        format: &str,
        args: &[&dyn LogValue],
    ) {
        if severity == Severity::Fatal {
            self.fatal_at(caller, format, args);
        }
        self.dispatch(severity, caller, format, args);
    }

    /// Write the fatal cascade with an explicit call site, then exit
    pub fn fatal_at(&self, caller: &Caller, format: &str, args: &[&dyn LogValue]) -> ! {
        self.dispatch(Severity::Fatal, caller, format, args);
        std::process::exit(FATAL_EXIT_CODE)
    }

    /// Render once and write to every file from `severity` down to the minimum
    ///
    /// Never exits, whatever the severity.
    pub(crate) fn dispatch(
        &self,
        severity: Severity,
        caller: &Caller,
        format: &str,
        args: &[&dyn LogValue],
    ) {
        if !self.enabled(severity) {
            return;
        }
        let Some(origin) = self.writer(severity) else {
            return;
        };

        let (len, buf) = format::render(
            origin.pool(),
            severity,
            &origin.clock().now(),
            caller,
            self.config.skip_file_name,
            format,
            args,
        );
        if len == 0 {
            return;
        }

        let mut target = Some(severity);
        while let Some(level) = target.filter(|l| *l >= self.config.level) {
            if let Some(writer) = self.writer(level) {
                writer.output(&buf, self.config.console && level == severity);
            }
            target = level.below();
        }
        // `buf` goes back to the pool here, once
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Local, TimeZone};
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct Fixture {
        temp_dir: TempDir,
        console: Arc<Mutex<Vec<u8>>>,
        logger: Logger,
    }

    fn fixture(level: Severity, console: bool) -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let captured = Arc::new(Mutex::new(Vec::new()));
        let config = Config {
            level,
            console,
            ..Config::with_dir(temp_dir.path())
        };
        let start = Local.with_ymd_and_hms(2024, 6, 1, 9, 30, 15).unwrap();
        let logger = Logger::builder(config)
            .clock(Arc::new(ManualClock::new(start)))
            .console(captured.clone())
            .build()
            .unwrap();

        Fixture {
            temp_dir,
            console: captured,
            logger,
        }
    }

    fn read(fx: &Fixture, name: &str) -> String {
        std::fs::read_to_string(fx.temp_dir.path().join(name)).unwrap_or_default()
    }

    #[test]
    fn test_writers_exist_from_minimum_up() {
        let fx = fixture(Severity::Error, false);
        assert!(fx.logger.writer(Severity::Debug).is_none());
        assert!(fx.logger.writer(Severity::Info).is_none());
        assert!(fx.logger.writer(Severity::Error).is_some());
        assert!(fx.logger.writer(Severity::Fatal).is_some());
        assert!(!fx.temp_dir.path().join("info.log").exists());
        assert!(fx.temp_dir.path().join("fatal.log").exists());
    }

    #[test]
    fn test_error_cascades_down_to_minimum() {
        let fx = fixture(Severity::Info, false);
        fx.logger
            .dispatch(Severity::Error, &Caller::new("app.rs", 7, "app::main"), "disk ?", &[&"full"]);

        let expected = "[ERROR] 2024-06-01 09:30:15.000 app.rs:7L(app::main) disk full\n";
        assert_eq!(read(&fx, "error.log"), expected);
        assert_eq!(read(&fx, "info.log"), expected);
        assert_eq!(read(&fx, "fatal.log"), "");
        assert!(!fx.temp_dir.path().join("debug.log").exists());
    }

    #[test]
    fn test_fatal_reaches_every_persisted_file() {
        let fx = fixture(Severity::Info, false);
        fx.logger
            .dispatch(Severity::Fatal, &Caller::UNKNOWN, "bye", &[]);

        let expected = "[FATAL] 2024-06-01 09:30:15.000 ???:0L(???) bye\n";
        for name in ["fatal.log", "error.log", "info.log"] {
            assert_eq!(read(&fx, name), expected, "{}", name);
        }
    }

    #[test]
    fn test_below_minimum_is_noop() {
        let fx = fixture(Severity::Error, false);
        let pool = fx.logger.writer(Severity::Error).unwrap().pool();
        let allocated = pool.allocated();
        let available = pool.available();

        fx.logger.info("ignored ?", &[&1]);
        fx.logger.debug("ignored", &[]);

        assert_eq!(pool.allocated(), allocated);
        assert_eq!(pool.available(), available);
        assert_eq!(read(&fx, "error.log"), "");
        assert_eq!(read(&fx, "fatal.log"), "");
    }

    #[test]
    fn test_debug_is_never_persisted() {
        let fx = fixture(Severity::Debug, false);
        assert_eq!(fx.logger.min_level(), Severity::Info);
        fx.logger.debug("dropped", &[]);
        assert!(!fx.temp_dir.path().join("debug.log").exists());
        assert_eq!(read(&fx, "info.log"), "");
    }

    #[test]
    fn test_console_echo_once_at_origin() {
        let fx = fixture(Severity::Info, true);
        fx.logger.error("boom", &[]);

        let console = String::from_utf8(fx.console.lock().unwrap().clone()).unwrap();
        assert_eq!(console.lines().count(), 1);
        assert!(console.starts_with("[ERROR] "));
        assert!(console.ends_with("boom\n"));
    }

    #[test]
    fn test_console_disabled() {
        let fx = fixture(Severity::Info, false);
        fx.logger.info("silent", &[]);
        assert!(fx.console.lock().unwrap().is_empty());
        assert!(read(&fx, "info.log").ends_with("silent\n"));
    }

    #[test]
    fn test_buffer_returned_after_dispatch() {
        let fx = fixture(Severity::Info, false);
        let pool = fx.logger.writer(Severity::Info).unwrap().pool();
        let available = pool.available();

        fx.logger.error("one ?", &[&1]);

        assert_eq!(pool.available(), available);
    }

    #[test]
    fn test_method_captures_call_site() {
        let fx = fixture(Severity::Info, false);
        let line = line!() + 1;
        fx.logger.info("here", &[]);

        let content = read(&fx, "info.log");
        assert!(
            content.contains(&format!("{}:{}L(???) here", file!(), line)),
            "{}",
            content
        );
    }

    #[test]
    fn test_skip_file_name_fragment() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            skip_file_name: true,
            ..Config::with_dir(temp_dir.path())
        };
        let logger = Logger::builder(config)
            .clock(Arc::new(ManualClock::new(
                Local.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            )))
            .build()
            .unwrap();

        logger.dispatch(Severity::Info, &Caller::new("a.rs", 3, "svc::start"), "up", &[]);

        let content = std::fs::read_to_string(temp_dir.path().join("info.log")).unwrap();
        assert_eq!(content, "[INFOR] 2024-06-01 00:00:00.000 svc::start:3 up\n");
    }

    #[test]
    fn test_build_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested").join("logs");
        let logger = Logger::new(Config::with_dir(&dir)).unwrap();
        assert_eq!(logger.dir(), dir.as_path());
        assert!(dir.join("info.log").exists());
    }

    #[test]
    fn test_build_fails_when_dir_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let err = Logger::new(Config::with_dir(blocker.join("logs"))).unwrap_err();
        assert!(matches!(err, LogError::CreateDir { .. }));
        assert_eq!(err.path(), &blocker.join("logs"));
    }
}
