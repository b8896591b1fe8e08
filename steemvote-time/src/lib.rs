// Copyright (c) 2022 THE STEEMVOTE AUTHORS
//! Millisecond timestamps and durations, with the chain timestamp format
#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

mod error;
pub use error::TimeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Milliseconds since the UNIX epoch, or a duration in milliseconds.
/// Serialized as a plain integer.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SteemTime(u64);

impl fmt::Display for SteemTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_millis())
    }
}

impl SteemTime {
    /// Conversion from `u64`, representing milliseconds.
    pub const fn from_millis(value: u64) -> Self {
        SteemTime(value)
    }

    /// Conversion from a number of seconds.
    pub const fn from_secs(value: u64) -> Self {
        SteemTime(value.saturating_mul(1000))
    }

    /// Conversion from a number of minutes.
    pub const fn from_minutes(value: u64) -> Self {
        SteemTime::from_secs(value.saturating_mul(60))
    }

    /// Current UNIX timestamp, in milliseconds.
    pub fn now() -> Result<Self, TimeError> {
        let now: u64 = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| TimeError::TimeOverflowError)?
            .as_millis()
            .try_into()
            .map_err(|_| TimeError::TimeOverflowError)?;
        Ok(SteemTime(now))
    }

    /// Conversion to `std::time::Duration`.
    pub fn to_duration(&self) -> Duration {
        Duration::from_millis(self.0)
    }

    /// Milliseconds
    pub const fn to_millis(&self) -> u64 {
        self.0
    }

    /// Elapsed time from `t`, zero when `t` is later.
    #[must_use]
    pub fn saturating_sub(self, t: SteemTime) -> Self {
        SteemTime(self.0.saturating_sub(t.0))
    }

    /// RFC 3339 rendering of a timestamp, for logs.
    pub fn format_instant(&self) -> String {
        let seconds = i64::try_from(self.to_millis() / 1000).unwrap_or(i64::MAX);
        OffsetDateTime::from_unix_timestamp(seconds)
            .ok()
            .and_then(|date_time| date_time.format(&Rfc3339).ok())
            .unwrap_or_else(|| self.to_string())
    }

    /// Parses the UTC timestamp format used by the chain API (no offset suffix).
    ///
    /// ```
    /// # use steemvote_time::*;
    /// let time = SteemTime::from_chain_str("2022-01-01T00:00:00").unwrap();
    /// assert_eq!(time, SteemTime::from_millis(1_640_995_200_000));
    /// assert!(SteemTime::from_chain_str("yesterday").is_err());
    /// ```
    pub fn from_chain_str(s: &str) -> Result<SteemTime, TimeError> {
        let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
        let date_time = PrimitiveDateTime::parse(s.trim_end_matches('Z'), &format)
            .map_err(|err| TimeError::ParseError(format!("{}: {}", s, err)))?
            .assume_utc();
        let millis = date_time
            .unix_timestamp_nanos()
            .checked_div(1_000_000)
            .ok_or(TimeError::ConversionError)?;
        Ok(SteemTime::from_millis(
            u64::try_from(millis).map_err(|_| TimeError::ConversionError)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_str_ignores_trailing_zulu() {
        let a = SteemTime::from_chain_str("2016-03-24T16:05:00").unwrap();
        let b = SteemTime::from_chain_str("2016-03-24T16:05:00Z").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.format_instant(), "2016-03-24T16:05:00Z");
        assert_eq!(
            SteemTime::from_chain_str("2022-01-01T00:00:00").unwrap(),
            SteemTime::from_millis(1_640_995_200_000)
        );
        assert_eq!(
            SteemTime::from_millis(42).saturating_sub(SteemTime::from_millis(50)),
            SteemTime::from_millis(0)
        );
    }

    #[test]
    fn test_unit_constructors() {
        assert_eq!(SteemTime::from_secs(2), SteemTime::from_millis(2_000));
        assert_eq!(SteemTime::from_minutes(2), SteemTime::from_millis(120_000));
        assert_eq!(SteemTime::from_secs(3).to_duration(), Duration::from_secs(3));
    }

    #[test]
    fn test_serde_is_plain_millis() {
        let time: SteemTime = serde_json::from_str("60000").unwrap();
        assert_eq!(time, SteemTime::from_minutes(1));
        assert_eq!(serde_json::to_string(&time).unwrap(), "60000");
    }
}
