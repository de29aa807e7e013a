//! # Temporal Types — ISO-8601 Dates and Datetimes
//!
//! Cached datetimes come in two flavours: naive wall-clock values and
//! offset-aware instants. `Timestamp` keeps both, and keeps sub-second
//! precision exactly, because a cache must hand back what it was given.
//!
//! ## Wire Format
//!
//! - Naive: `YYYY-MM-DDTHH:MM:SS[.fraction]` (fraction only when non-zero,
//!   3/6/9 digits).
//! - Aware: RFC 3339 with an explicit numeric offset, e.g.
//!   `2024-12-23T10:30:00.123456+00:00`.
//! - Dates: `YYYY-MM-DD`.
//!
//! Parsing is lenient in the same places ISO readers usually are: a space
//! may replace `T`, seconds may be omitted, and a bare date parses as
//! midnight.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::error::ParseError;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A datetime that is either naive or carries a fixed UTC offset.
///
/// Equality follows chrono: naive values compare field-wise, aware values
/// compare as instants. A naive value never equals an aware one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timestamp {
    /// Wall-clock time with no zone information.
    Naive(NaiveDateTime),
    /// An instant with its original offset.
    Aware(DateTime<FixedOffset>),
}

impl Timestamp {
    /// Parse an ISO-8601 datetime.
    ///
    /// Strings with an offset (`Z`, `+05:30`, ...) become `Aware`; everything
    /// else becomes `Naive`.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidDateTime` if no accepted layout matches.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::Aware(dt));
        }
        for fmt in NAIVE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(Self::Naive(dt));
            }
        }
        if let Ok(date) = parse_date(s) {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return Ok(Self::Naive(midnight));
            }
        }
        Err(ParseError::InvalidDateTime(s.to_string()))
    }

    /// Render as ISO-8601, keeping every non-zero fractional digit.
    pub fn to_iso8601(&self) -> String {
        match self {
            Self::Naive(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            Self::Aware(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, false),
        }
    }

    /// Returns true if the value carries an offset.
    pub fn is_aware(&self) -> bool {
        matches!(self, Self::Aware(_))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(dt: NaiveDateTime) -> Self {
        Self::Naive(dt)
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::Aware(dt)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Aware(dt.fixed_offset())
    }
}

/// Render a calendar date as `YYYY-MM-DD`.
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns `ParseError::InvalidDate` on any other layout or an impossible date.
pub fn parse_date(s: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| ParseError::InvalidDate(s.to_string()))
}
