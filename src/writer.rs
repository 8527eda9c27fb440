//! Per-severity file writer with midnight rotation
//!
//! Each [`LevelWriter`] owns the active file of one severity. Every write
//! first checks whether the stored midnight boundary has passed; if so the
//! active file is archived under yesterday's date and a fresh one is opened,
//! all under the same lock as the write itself.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Days, Local};

use crate::clock::{self, Clock};
use crate::error::{LogError, Result};
use crate::pool::BufferPool;
use crate::retention;
use crate::severity::Severity;

/// Shared destination for console echo
pub type ConsoleSink = Arc<Mutex<dyn Write + Send>>;

/// A console sink writing to the process stdout
pub fn stdout_sink() -> ConsoleSink {
    Arc::new(Mutex::new(io::stdout()))
}

struct WriterState {
    file: File,
    next_midnight: DateTime<Local>,
}

/// Writer for the active file of a single severity
pub struct LevelWriter {
    severity: Severity,
    dir: PathBuf,
    retention_days: u32,
    pool: Arc<BufferPool>,
    console: ConsoleSink,
    clock: Arc<dyn Clock>,
    state: Mutex<WriterState>,
}

/// What happened during one [`LevelWriter::output`] call
#[derive(Debug, Default)]
struct OutputReport {
    rotated: Option<PathBuf>,
    rotate_error: Option<io::Error>,
    write_error: Option<io::Error>,
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .create(true)
        .append(true)
        .open(path)
}

impl LevelWriter {
    /// Open (or create) the active file for `severity` in `dir`
    pub fn open(
        severity: Severity,
        dir: &Path,
        retention_days: u32,
        pool: Arc<BufferPool>,
        console: ConsoleSink,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let path = dir.join(severity.file_name());
        let file = open_append(&path).map_err(|source| LogError::OpenFile {
            path: path.clone(),
            source,
        })?;
        let next_midnight = clock::next_midnight(&clock.now());

        Ok(Self {
            severity,
            dir: dir.to_path_buf(),
            retention_days,
            pool,
            console,
            clock,
            state: Mutex::new(WriterState {
                file,
                next_midnight,
            }),
        })
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Path of the active file
    pub fn path(&self) -> PathBuf {
        self.dir.join(self.severity.file_name())
    }

    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// The boundary at which the next rotation happens
    pub fn next_midnight(&self) -> DateTime<Local> {
        self.lock().next_midnight
    }

    /// Write `data` to the active file, and to the console when `echo` is set
    ///
    /// Rotates first if the midnight boundary has passed. Failures are never
    /// returned: a line that cannot be written is dropped.
    pub fn output(&self, data: &[u8], echo: bool) {
        let report = {
            let mut state = self.lock();
            let mut report = OutputReport::default();

            if self.clock.now() >= state.next_midnight {
                match self.rotate(&mut state) {
                    Ok(archive) => report.rotated = Some(archive),
                    Err(e) => report.rotate_error = Some(e),
                }
            }

            if let Err(e) = state.file.write_all(data) {
                report.write_error = Some(e);
            }
            if echo {
                if let Ok(mut console) = self.console.lock() {
                    let _ = console.write_all(data);
                    let _ = console.flush();
                }
            }
            report
        };

        // Diagnostics go out only after the lock is released
        if let Some(archive) = report.rotated {
            tracing::debug!(severity = %self.severity, archive = %archive.display(), "Rotated log file");
        }
        if let Some(e) = report.rotate_error {
            tracing::warn!(severity = %self.severity, error = %e, "Log rotation incomplete");
        }
        if let Some(e) = report.write_error {
            tracing::warn!(severity = %self.severity, error = %e, "Dropped log line");
        }
    }

    /// Archive the active file and reopen a fresh one
    ///
    /// The boundary always advances by one day, even when the rename or the
    /// reopen fails, so a broken directory does not retry on every write.
    fn rotate(&self, state: &mut WriterState) -> io::Result<PathBuf> {
        let base = self.severity.file_name();
        let boundary = state.next_midnight.date_naive();
        let yesterday = boundary.pred_opt().unwrap_or(boundary);

        let active = self.path();
        let archive = self.dir.join(retention::archive_name(base, yesterday));

        let next_day = boundary.checked_add_days(Days::new(1)).unwrap_or(boundary);
        state.next_midnight = clock::start_of_day(next_day);

        let renamed = fs::rename(&active, &archive);
        let file = open_append(&active)?;
        // Replacing the handle closes the old file
        state.file = file;

        retention::spawn_prune(
            self.dir.clone(),
            base,
            retention::cutoff_date(boundary, self.retention_days),
        );

        renamed.map(|()| archive)
    }

    fn lock(&self) -> MutexGuard<'_, WriterState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for LevelWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelWriter")
            .field("severity", &self.severity)
            .field("dir", &self.dir)
            .field("retention_days", &self.retention_days)
            .finish_non_exhaustive()
    }
}
