//! Pure display-formatting helpers.
//!
//! The weather API hands out timezone-naive Unix UTC timestamps plus a
//! per-location offset in seconds; everything here combines the two for
//! local display. All functions are total for well-formed numeric input;
//! out-of-range timestamps fall back to the epoch instead of panicking.

use chrono::{DateTime, FixedOffset, Offset, Utc};

fn to_local(unix_utc_secs: i64, timezone_offset_secs: i32) -> DateTime<FixedOffset> {
    let utc = DateTime::<Utc>::from_timestamp(unix_utc_secs, 0).unwrap_or_default();
    let offset = FixedOffset::east_opt(timezone_offset_secs).unwrap_or_else(|| Utc.fix());
    utc.with_timezone(&offset)
}

/// Local calendar date, e.g. "Thursday 16, Feb".
pub fn format_date(unix_utc_secs: i64, timezone_offset_secs: i32) -> String {
    to_local(unix_utc_secs, timezone_offset_secs)
        .format("%A %-d, %b")
        .to_string()
}

/// Local wall-clock time, e.g. "5:43 PM".
pub fn format_time(unix_utc_secs: i64, timezone_offset_secs: i32) -> String {
    to_local(unix_utc_secs, timezone_offset_secs)
        .format("%-I:%M %p")
        .to_string()
}

/// Local hour only, e.g. "5 PM".
pub fn format_hour(unix_utc_secs: i64, timezone_offset_secs: i32) -> String {
    to_local(unix_utc_secs, timezone_offset_secs)
        .format("%-I %p")
        .to_string()
}

/// Wind speeds arrive in m/s; the dashboard shows km/h.
pub fn mps_to_kmh(speed_mps: f64) -> f64 {
    speed_mps * 3.6
}

/// Badge text for the ordinal 1..=5 air-quality index.
pub fn aqi_label(aqi: u8) -> &'static str {
    match aqi {
        1 => "Good",
        2 => "Fair",
        3 => "Moderate",
        4 => "Poor",
        5 => "Very Poor",
        _ => "Unknown",
    }
}

/// Compass point for a wind direction in degrees (0 = north, clockwise).
pub fn degrees_to_cardinal(deg: u16) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let idx = ((f64::from(deg % 360) + 22.5) / 45.0) as usize % 8;
    POINTS[idx]
}
