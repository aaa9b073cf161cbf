// src/utils/serialization.rs
//! Timestamp formatting shared by the envelope builder and the audit log.

use chrono::{DateTime, SecondsFormat, Utc};

/// Formats a timestamp as ISO-8601 with millisecond precision and a `Z` suffix.
///
/// Example: `2024-08-01T09:30:00.000Z`
pub fn to_iso8601(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_iso8601_millis_zulu() {
        let timestamp = Utc.with_ymd_and_hms(2024, 8, 1, 9, 30, 0).unwrap();
        assert_eq!(to_iso8601(timestamp), "2024-08-01T09:30:00.000Z");
    }
}
