use chrono::{DateTime, SecondsFormat, Utc};

/// Source of "now" for row timestamps. Injected so formatting can run against a frozen clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Row timestamp text: RFC 3339, UTC, microsecond precision, trailing `Z`.
pub fn format_row_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Converts a provider unix timestamp (seconds), falling back to `fallback` when absent or out of range.
pub fn from_unix_seconds(secs: Option<i64>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_timestamp_format() {
        let at = DateTime::from_timestamp(1_700_000_000, 123_456_000).unwrap();
        assert_eq!(format_row_timestamp(at), "2023-11-14T22:13:20.123456Z");
    }

    #[test]
    fn test_from_unix_seconds() {
        let fallback = DateTime::from_timestamp(0, 0).unwrap();
        let at = from_unix_seconds(Some(1_700_000_000), fallback);
        assert_eq!(at.timestamp(), 1_700_000_000);
        assert_eq!(from_unix_seconds(None, fallback), fallback);
    }
}
