//! # Time Primitives
//!
//! Timestamp alias, the authority's wire format, and the `TimeSource` port
//! that lets services run against a controllable clock in tests.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Instant type used throughout the workspace.
pub type Timestamp = DateTime<Utc>;

/// Wire format mandated by the authority: `YYYYMMDDHHmmssSSS` (17 chars,
/// millisecond precision).
pub const AUTHORITY_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S%3f";

/// Format an instant in the authority's 17-character wire format.
pub fn authority_timestamp(ts: Timestamp) -> String {
    ts.format(AUTHORITY_TIMESTAMP_FORMAT).to_string()
}

/// Parse a 17-character authority timestamp. Returns `None` on any shape
/// mismatch; callers decide whether that is a protocol fault.
pub fn parse_authority_timestamp(raw: &str) -> Option<Timestamp> {
    if raw.len() != 17 {
        return None;
    }
    NaiveDateTime::parse_from_str(raw, AUTHORITY_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Clock abstraction. Services never call `Utc::now()` directly so tests
/// can drive validity windows and deadlines deterministically.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Default time source using the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Manually advanced clock for tests: validity windows, deadlines and
/// skew checks all become deterministic.
#[derive(Debug)]
pub struct ManualTimeSource {
    now: std::sync::Mutex<Timestamp>,
}

impl ManualTimeSource {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: std::sync::Mutex::new(start),
        }
    }

    /// Move the clock to an absolute instant.
    pub fn set(&self, instant: Timestamp) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = instant;
        }
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, by: chrono::Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        self.now.lock().map(|guard| *guard).unwrap_or_else(|p| *p.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_authority_timestamp_format() {
        let ts = Utc
            .with_ymd_and_hms(2024, 7, 1, 14, 30, 25)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(123))
            .unwrap();
        assert_eq!(authority_timestamp(ts), "20240701143025123");
    }

    #[test]
    fn test_parse_round_trip() {
        let raw = "20240701143025123";
        let parsed = parse_authority_timestamp(raw).unwrap();
        assert_eq!(authority_timestamp(parsed), raw);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(parse_authority_timestamp("20240701").is_none());
        assert!(parse_authority_timestamp("202407011430251234").is_none());
    }

    #[test]
    fn test_parse_rejects_non_digits() {
        assert!(parse_authority_timestamp("202407011430251ab").is_none());
    }
}
