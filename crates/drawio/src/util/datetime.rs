//! Timestamps for the `modified` attribute.
//!
//! Timestamps are written in UTC with millisecond precision, e.g.
//! `2023-04-05T06:07:08.009Z`. The current time is injected through
//! [`Clock`] so documents can be built reproducibly.

use chrono::{DateTime, SecondsFormat, Utc};

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Formats a timestamp for the `modified` attribute.
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a `modified` attribute. Any RFC 3339 offset is accepted and
/// converted to UTC.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(text).map(|t| t.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format_millis_utc() {
        let time = Utc.with_ymd_and_hms(2023, 4, 5, 6, 7, 8).unwrap()
            + chrono::Duration::milliseconds(9);
        assert_eq!(format_timestamp(time), "2023-04-05T06:07:08.009Z");
    }

    #[test]
    fn test_parse_roundtrip() {
        let time = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let text = format_timestamp(time);
        assert_eq!(text, "2024-12-31T23:59:59.000Z");
        assert_eq!(parse_timestamp(&text).unwrap(), time);
    }

    #[test]
    fn test_parse_offset() {
        let parsed = parse_timestamp("2024-01-01T02:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert!(parse_timestamp("01/02/2024").is_err());
    }

    #[test]
    fn test_fixed_clock() {
        let time = Utc.with_ymd_and_hms(2020, 2, 29, 12, 0, 0).unwrap();
        let clock = FixedClock(time);
        assert_eq!(clock.now(), time);
        assert_eq!(clock.now(), clock.now());
    }
}
