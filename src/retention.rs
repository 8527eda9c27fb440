//! Rotated file retention
//!
//! Rotated files are named `<base>.<YYYYMMDD>`. Anything older than the
//! retention window is deleted; anything whose date cannot be read is kept.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use chrono::{Days, NaiveDate};

/// Name of the archive for `base` covering `date`
pub fn archive_name(base: &str, date: NaiveDate) -> String {
    format!("{}.{}", base, date.format("%Y%m%d"))
}

/// Read the date from the trailing `YYYYMMDD` of an archive name
///
/// Returns `None` when the suffix is not a valid date; such files never expire.
pub fn archive_date(file_name: &str) -> Option<NaiveDate> {
    let len = file_name.len();
    if len < 8 || !file_name.is_char_boundary(len - 8) {
        return None;
    }
    let suffix = &file_name[len - 8..];
    if !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let year = suffix[..4].parse().ok()?;
    let month = suffix[4..6].parse().ok()?;
    let day = suffix[6..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// First day kept when pruning relative to `boundary` with `retention_days`
pub fn cutoff_date(boundary: NaiveDate, retention_days: u32) -> NaiveDate {
    boundary
        .checked_sub_days(Days::new(u64::from(retention_days)))
        .unwrap_or(NaiveDate::MIN)
}

/// Delete archives of `base` in `dir` dated before `cutoff`
///
/// Best effort: unreadable entries and failed deletions are skipped. Returns
/// the number of files deleted. The active file never matches, since only
/// names containing `<base>.` are considered.
pub fn prune_archives(dir: &Path, base: &str, cutoff: NaiveDate) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "Cannot list log directory");
            return 0;
        }
    };

    let keyword = format!("{}.", base);
    let mut deleted_count = 0;

    for entry in entries.flatten() {
        let path = entry.path();

        if entry.file_type().map(|t| t.is_dir()).unwrap_or(true) {
            continue;
        }

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.contains(&keyword) {
            continue;
        }

        match archive_date(name) {
            Some(date) if date < cutoff => {
                if fs::remove_file(&path).is_ok() {
                    deleted_count += 1;
                }
            }
            _ => {}
        }
    }

    if deleted_count > 0 {
        tracing::debug!(base, deleted_count, "Pruned old log archives");
    }
    deleted_count
}

/// Run [`prune_archives`] on a background thread
pub fn spawn_prune(dir: PathBuf, base: &'static str, cutoff: NaiveDate) {
    let spawned = thread::Builder::new()
        .name(format!("levelog-prune-{}", base))
        .spawn(move || prune_archives(&dir, base, cutoff));
    if let Err(e) = spawned {
        tracing::debug!(base, error = %e, "Could not start retention cleanup");
    }
}
