//! Duration and wall-clock label formatting.

use time::{OffsetDateTime, UtcOffset};

const ZERO_CLOCK: &str = "0:00:00";

/// Format a media offset in seconds as `HH:MM:SS`.
///
/// Negative offsets keep a leading `-`; fractional seconds are truncated.
pub fn format_media_time(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "00:00:00".to_string();
    }
    let sign = if seconds < 0.0 { "-" } else { "" };
    let total = seconds.abs().floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{sign}{hours:02}:{minutes:02}:{secs:02}")
}

/// Format an optional offset; `None` keeps the label hidden.
pub fn format_optional_media_time(seconds: Option<f64>) -> Option<String> {
    seconds.map(format_media_time)
}

/// Format unix seconds as a 12-hour wall clock, e.g. `3:04:05 PM`.
pub fn format_clock_time(unix_seconds: f64, offset: UtcOffset) -> String {
    if !unix_seconds.is_finite() || unix_seconds <= 0.0 {
        return ZERO_CLOCK.to_string();
    }
    let Ok(utc) = OffsetDateTime::from_unix_timestamp(unix_seconds.floor() as i64) else {
        return ZERO_CLOCK.to_string();
    };
    let local = utc.to_offset(offset);
    let (hour, suffix) = match local.hour() {
        0 => (12, "AM"),
        h @ 1..=11 => (h, "AM"),
        12 => (12, "PM"),
        h => (h - 12, "PM"),
    };
    format!("{hour}:{:02}:{:02} {suffix}", local.minute(), local.second())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_time_pads_components() {
        assert_eq!(format_media_time(0.0), "00:00:00");
        assert_eq!(format_media_time(62.9), "00:01:02");
        assert_eq!(format_media_time(3725.0), "01:02:05");
    }

    #[test]
    fn media_time_keeps_negative_sign() {
        assert_eq!(format_media_time(-75.0), "-00:01:15");
    }

    #[test]
    fn media_time_handles_non_finite() {
        assert_eq!(format_media_time(f64::NAN), "00:00:00");
        assert_eq!(format_optional_media_time(None), None);
    }

    #[test]
    fn clock_time_uses_twelve_hour_format() {
        // 2021-01-01T13:04:05Z
        let ts = 1_609_506_245.0;
        assert_eq!(format_clock_time(ts, UtcOffset::UTC), "1:04:05 PM");
        let minus_two = UtcOffset::from_hms(-2, 0, 0).unwrap();
        assert_eq!(format_clock_time(ts, minus_two), "11:04:05 AM");
    }

    #[test]
    fn clock_time_midnight_is_twelve_am() {
        // 2021-01-01T00:00:30Z
        assert_eq!(format_clock_time(1_609_459_230.0, UtcOffset::UTC), "12:00:30 AM");
    }

    #[test]
    fn clock_time_zero_for_missing_timestamp() {
        assert_eq!(format_clock_time(0.0, UtcOffset::UTC), "0:00:00");
        assert_eq!(format_clock_time(f64::INFINITY, UtcOffset::UTC), "0:00:00");
    }
}
