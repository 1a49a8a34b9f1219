use chrono::{NaiveTime, TimeDelta};

use crate::error::TimeParseError;

const MICROS_PER_HOUR: f64 = 3_600_000_000.0;

/// Parse a caller-supplied clock time, `HH:MM:SS` or `HH:MM`, 24-hour.
pub fn parse_clock(input: &str) -> Result<NaiveTime, TimeParseError> {
    let trimmed = input.trim();
    ["%H:%M:%S", "%H:%M"]
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| TimeParseError {
            input: input.to_string(),
        })
}

/// Time needed to drive `miles` at `speed_mph`, to the microsecond.
pub fn travel_time(miles: f64, speed_mph: f64) -> TimeDelta {
    let micros = (miles / speed_mph * MICROS_PER_HOUR).round();
    TimeDelta::microseconds(micros as i64)
}

/// Collapse runs of whitespace so addresses typed slightly differently in the
/// package file and the distance table still match.
pub fn normalize_address(address: &str) -> String {
    address.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build a clock time from literal components, used for the built-in tables.
pub(crate) fn hms(hour: u32, minute: u32, second: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, second).unwrap_or(NaiveTime::MIN)
}

/// Render a clock time without sub-second noise.
pub fn format_clock(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}
