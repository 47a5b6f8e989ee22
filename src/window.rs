//! window.rs — the 7-day lookback that scopes each weekly search.

use chrono::{DateTime, Duration, NaiveDate, TimeZone};

pub const LOOKBACK_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeWindow {
    /// Window ending on `end` and starting `LOOKBACK_DAYS` earlier.
    pub fn ending(end: NaiveDate) -> Self {
        Self {
            start: end - Duration::days(LOOKBACK_DAYS),
            end,
        }
    }

    pub fn ending_at<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        Self::ending(now.date_naive())
    }

    /// e.g. "October 10"
    pub fn start_label(&self) -> String {
        month_day(self.start)
    }

    /// e.g. "October 17, 2026"
    pub fn end_label(&self) -> String {
        month_day_year(self.end)
    }
}

pub fn month_day(d: NaiveDate) -> String {
    d.format("%B %d").to_string()
}

pub fn month_day_year(d: NaiveDate) -> String {
    d.format("%B %d, %Y").to_string()
}
