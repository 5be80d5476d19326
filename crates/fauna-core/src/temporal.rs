//! Time values carried by the wire protocol
//!
//! The database reports instants with nanosecond precision. A [`Timestamp`]
//! keeps that precision in its stored instant and renders it back without
//! loss; the millisecond and microsecond accessors are the coarse, lossy
//! views. A [`CalendarDate`] is a date without a time of day.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use std::fmt;
use std::str::FromStr;

/// Wire format of a calendar date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// `%Y` takes a signed year of any width
const EXTENDED_YEAR_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A point in time with nanosecond precision
///
/// Equality compares the canonical ISO-8601 rendering, which is a bijection
/// of the stored UTC instant.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create from a native time value
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Parse an ISO-8601 / RFC 3339 string
    ///
    /// Any offset is accepted and normalised to UTC. Years outside
    /// `0000..=9999` are written with a sign (`+10000-01-01T00:00:00Z`) and
    /// are only accepted in UTC.
    pub fn parse(s: &str) -> Result<Self> {
        match DateTime::parse_from_rfc3339(s) {
            Ok(dt) => Ok(Self(dt.with_timezone(&Utc))),
            Err(e) => s
                .strip_suffix('Z')
                .filter(|naive| naive.starts_with(['+', '-']))
                .and_then(|naive| NaiveDateTime::parse_from_str(naive, EXTENDED_YEAR_FORMAT).ok())
                .map(|dt| Self(dt.and_utc()))
                .ok_or_else(|| Error::format(format!("invalid timestamp '{}': {}", s, e))),
        }
    }

    /// The Unix epoch
    pub fn epoch() -> Self {
        Self(DateTime::<Utc>::default())
    }

    /// Get as native time value
    pub fn to_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Microseconds since the Unix epoch, dropping sub-microsecond digits
    pub fn timestamp_micros(&self) -> i64 {
        self.0.timestamp_micros()
    }

    /// Milliseconds since the Unix epoch, dropping sub-millisecond digits
    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Canonical form: UTC with a `Z` suffix and every non-zero fractional digit
    pub fn to_iso_string(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.to_iso_string())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

/// A date without time of day
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Create from year, month and day
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| {
                Error::format(format!("invalid date {:04}-{:02}-{:02}", year, month, day))
            })
    }

    /// Parse a `YYYY-MM-DD` string
    pub fn parse(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Self)
            .map_err(|e| Error::format(format!("invalid date '{}': {}", s, e)))
    }

    /// Get as native date value
    pub fn to_naive_date(&self) -> NaiveDate {
        self.0
    }

    /// Canonical `YYYY-MM-DD` form
    pub fn to_iso_string(&self) -> String {
        self.0.format(DATE_FORMAT).to_string()
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl FromStr for CalendarDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Debug for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CalendarDate({})", self.to_iso_string())
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}
