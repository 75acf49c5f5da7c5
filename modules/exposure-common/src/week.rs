//! Week bucketing: fixed 7-day windows counted from a configured epoch.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::ExposureError;

pub const DAYS_PER_WEEK: i64 = 7;
const WEEK_SECONDS: i64 = DAYS_PER_WEEK * 24 * 60 * 60;

/// Maps timestamps to 1-indexed week numbers.
///
/// Week `n` covers `[epoch + 7(n-1) days, epoch + 7n days)`, so a timestamp
/// exactly at the epoch is week 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekClock {
    epoch: DateTime<Utc>,
}

impl WeekClock {
    pub fn new(epoch: DateTime<Utc>) -> Self {
        Self { epoch }
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    /// Week number for `ts`, or `None` when `ts` precedes the epoch.
    pub fn week_of(&self, ts: DateTime<Utc>) -> Option<u32> {
        let elapsed = ts - self.epoch;
        if elapsed < Duration::zero() {
            return None;
        }
        let week = elapsed.num_seconds() / WEEK_SECONDS + 1;
        u32::try_from(week).ok()
    }

    /// First instant of week `week` (week 1 starts at the epoch).
    pub fn week_start(&self, week: u32) -> DateTime<Utc> {
        self.epoch + Duration::days(DAYS_PER_WEEK * (i64::from(week) - 1))
    }
}

/// Parse the timestamp formats that appear in the message logs and config:
/// RFC 3339, pandas-style `YYYY-MM-DD HH:MM:SS[.f]+00:00`, naive date-times
/// (taken as UTC) and bare dates (midnight UTC).
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ExposureError> {
    let s = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(ExposureError::Timestamp {
        value: value.to_string(),
    })
}
