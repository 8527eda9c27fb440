//! Wall-clock source used for timestamps and midnight rotation

use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};

/// Source of the current local time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// The system wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to
///
/// Lets tests cross a midnight boundary without waiting for one.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Local>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Local>) {
        if let Ok(mut current) = self.now.lock() {
            *current = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut current) = self.now.lock() {
            *current += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        self.now.lock().map(|now| *now).unwrap_or_else(|_| Local::now())
    }
}

/// Local midnight at the start of `date`
///
/// Where midnight does not exist (a DST gap), the first instant of the day is
/// used instead.
pub fn start_of_day(date: NaiveDate) -> DateTime<Local> {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    match Local.from_local_datetime(&midnight).earliest() {
        Some(start) => start,
        None => {
            // Skip ahead through the gap an hour at a time
            let mut probe = midnight;
            loop {
                probe += Duration::hours(1);
                if let Some(start) = Local.from_local_datetime(&probe).earliest() {
                    break start;
                }
            }
        }
    }
}

/// The local midnight immediately following `now`
pub fn next_midnight(now: &DateTime<Local>) -> DateTime<Local> {
    let tomorrow = now
        .date_naive()
        .succ_opt()
        .unwrap_or_else(|| now.date_naive());
    start_of_day(tomorrow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_next_midnight_is_following_day() {
        let now = Local.with_ymd_and_hms(2024, 5, 17, 13, 45, 0).unwrap();
        let boundary = next_midnight(&now);
        assert_eq!(
            boundary.date_naive(),
            NaiveDate::from_ymd_opt(2024, 5, 18).unwrap()
        );
        assert_eq!(boundary.hour(), 0);
        assert!(boundary > now);
    }

    #[test]
    fn test_next_midnight_across_month_end() {
        let now = Local.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
        assert_eq!(
            next_midnight(&now).date_naive(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_manual_clock_advances() {
        let start = Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance(Duration::hours(13));
        assert_eq!(
            clock.now().date_naive(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }
}
