//! Borg 1.x timestamp handling.
//!
//! Borg prints local wall-clock times without a zone, e.g.
//! `Wed, 2016-01-27 03:01:19`. They are taken as UTC.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Layout of the three-field timestamp in `borg list` output.
pub const BORG_TIME_FORMAT: &str = "%a, %Y-%m-%d %H:%M:%S";

/// Number of whitespace-separated fields a timestamp occupies.
pub const TIMESTAMP_FIELDS: usize = 3;

pub fn parse_borg_time(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, BORG_TIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// RFC3339 with whole seconds and a `Z` suffix.
pub fn to_rfc3339(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}
