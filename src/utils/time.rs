//! Timestamp helpers for chat messages.
//!
//! Used as `#[serde(with = "crate::utils::time")]` on `OffsetDateTime` fields,
//! which then travel as RFC 3339 strings.

use serde::{Deserialize, Deserializer, Serializer};
use time::{OffsetDateTime, UtcOffset};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

/// Deserialize an RFC 3339 formatted string into an OffsetDateTime
pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    OffsetDateTime::parse(&s, &Rfc3339).map_err(serde::de::Error::custom)
}

/// Serialize an OffsetDateTime into an RFC 3339 formatted string
pub fn serialize<S>(datetime: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let s = datetime
        .format(&Rfc3339)
        .map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&s)
}

/// Formats the time as `HH:MM` on the local clock.
///
/// Falls back to UTC when the local offset cannot be determined.
pub fn clock_label(datetime: OffsetDateTime) -> String {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    format_clock(datetime.to_offset(offset))
}

/// Formats `HH:MM` in the datetime's own offset.
fn format_clock(datetime: OffsetDateTime) -> String {
    datetime
        .format(format_description!("[hour]:[minute]"))
        .unwrap_or_default()
}

/// Milliseconds since the Unix epoch.
pub fn unix_millis(datetime: OffsetDateTime) -> i128 {
    datetime.unix_timestamp_nanos() / 1_000_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{datetime, offset};

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(datetime!(2026-10-14 09:05:59 UTC)), "09:05");
        assert_eq!(format_clock(datetime!(2026-10-14 23:40 UTC)), "23:40");
    }

    #[test]
    fn clock_uses_the_given_offset() {
        let utc = datetime!(2026-10-14 23:40 UTC);
        assert_eq!(format_clock(utc.to_offset(offset!(+5:30))), "05:10");
        assert_eq!(format_clock(utc.to_offset(offset!(-7))), "16:40");
    }

    #[test]
    fn clock_label_shows_local_time() {
        let utc = datetime!(2026-10-14 23:40 UTC);
        let local = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
        assert_eq!(clock_label(utc), format_clock(utc.to_offset(local)));
        assert_eq!(clock_label(utc.to_offset(offset!(+9))), clock_label(utc));
    }

    #[test]
    fn millis_since_epoch() {
        assert_eq!(unix_millis(datetime!(1970-01-01 00:00:01.5 UTC)), 1500);
    }
}
