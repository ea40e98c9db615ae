//! Serde helpers for the timestamps exchanged with the backend.
//!
//! The backend writes naive UTC timestamps (`2024-05-01T10:00:00.123456`)
//! without any offset, while other producers use RFC 3339. Both forms are
//! accepted, and RFC 3339 is always written back.
//!
//! Use it with `#[serde(with = "career_chat_model::timestamp")]`.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer, de};

/// Parses a timestamp in RFC 3339 or naive ISO-8601 form.
///
/// Naive timestamps are interpreted as UTC.
pub fn parse(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(s) {
        Ok(ts) => Ok(ts.with_timezone(&Utc)),
        Err(_) => s.parse::<NaiveDateTime>().map(|ts| ts.and_utc()),
    }
}

/// Serializes a timestamp as RFC 3339.
pub fn serialize<S: Serializer>(
    ts: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Deserializes a timestamp written by [`serialize`] or by the backend.
pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse(&s).map_err(|err| de::Error::custom(format!("{err}: {s:?}")))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike};

    use super::*;

    #[test]
    fn test_parse_naive_as_utc() {
        let ts = parse("2024-05-01T10:00:00.123456").unwrap();
        assert_eq!(
            ts.with_nanosecond(0).unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
        );
        assert_eq!(ts.nanosecond(), 123_456_000);

        let ts = parse("2024-05-01T10:00:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_with_offset() {
        let ts = parse("2024-05-01T15:30:00+05:30").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());

        let ts = parse("2024-05-01T10:00:00Z").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse("yesterday").is_err());
        assert!(parse("").is_err());
    }
}
