//! Date utilities: day arithmetic for the timeline and timezone-aware "today".

use chrono::{Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::{Result, VelocityError};

/// Whole days from `a` to `b` (negative when `b` is earlier).
pub fn days_from(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// Day count used by the Gantt grid: never less than one.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    days_from(a, b).max(1)
}

pub fn add_days(d: NaiveDate, days: i64) -> NaiveDate {
    d + Duration::days(days)
}

/// Parse a close date like "2026-02-20".
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| VelocityError::InvalidDate(format!("'{s}': {e}")))
}

/// Current calendar date in an IANA tz like "America/Chicago".
pub fn today_in(tz: &str) -> Result<NaiveDate> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| VelocityError::InvalidDate(format!("invalid timezone: {tz}")))?;
    Ok(Utc::now().with_timezone(&tz).date_naive())
}
