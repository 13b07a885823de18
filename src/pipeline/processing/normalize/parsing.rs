//! Cell-level parsers shared by the normalizers and the table codec.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::HOST_TIMESTAMP_FORMAT;

static PRICE_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[$,]").expect("static price regex"));

const DATE_LAYOUTS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const TIME_SEPARATORS: [&str; 2] = ["T", " "];
const TIME_LAYOUTS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];
const OFFSET_LAYOUTS: [&str; 2] = ["%:z", "%z"];

/// Every date × separator × time combination, without an offset
static NAIVE_FORMATS: Lazy<Vec<String>> = Lazy::new(|| {
    let mut formats = Vec::new();
    for date in DATE_LAYOUTS {
        for sep in TIME_SEPARATORS {
            for time in TIME_LAYOUTS {
                formats.push(format!("{}{}{}", date, sep, time));
            }
        }
    }
    formats
});

/// The naive layouts, each followed by an offset with or without a colon
static OFFSET_FORMATS: Lazy<Vec<String>> = Lazy::new(|| {
    NAIVE_FORMATS
        .iter()
        .flat_map(|naive| OFFSET_LAYOUTS.iter().map(move |offset| format!("{}{}", naive, offset)))
        .collect()
});

/// Parse a raw host timestamp in the fixed `DD-MM-YY HH:MM` layout
pub fn parse_host_timestamp(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value.trim(), HOST_TIMESTAMP_FORMAT)
        .map_err(|e| format!("expected {}: {}", HOST_TIMESTAMP_FORMAT, e))
}

/// Parse an ISO-style timestamp, detecting the layout.
///
/// Offset-annotated inputs keep their wall-clock time; the offset is dropped,
/// not applied. A bare date parses as midnight.
pub fn parse_flexible_timestamp(value: &str) -> Result<NaiveDateTime, String> {
    let text = value.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts.naive_local());
    }
    for format in OFFSET_FORMATS.iter() {
        if let Ok(ts) = DateTime::parse_from_str(text, format) {
            return Ok(ts.naive_local());
        }
    }

    let text = text.strip_suffix('Z').unwrap_or(text);
    for format in NAIVE_FORMATS.iter() {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(ts);
        }
    }
    for format in DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(date.and_time(NaiveTime::MIN));
        }
    }

    Err(format!("unrecognized timestamp layout: {:?}", value))
}

/// Strip `$` and thousands separators, then parse as a float
pub fn parse_price(value: &str) -> Result<f64, String> {
    let cleaned = PRICE_NOISE.replace_all(value.trim(), "");
    cleaned
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("not numeric after stripping symbols ({:?}): {}", cleaned, e))
}

/// Floor a timestamp to the start of its hour
pub fn truncate_to_hour(ts: NaiveDateTime) -> NaiveDateTime {
    NaiveTime::from_hms_opt(ts.hour(), 0, 0)
        .map(|start| ts.date().and_time(start))
        .unwrap_or(ts)
}

/// Treat empty and whitespace-only cells as null
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_host_timestamp_uses_day_first_two_digit_year() {
        let parsed = parse_host_timestamp("03-11-21 14:05").unwrap();
        assert_eq!(parsed, ts(2021, 11, 3, 14, 5, 0));
    }

    #[test]
    fn test_host_timestamp_rejects_iso_layout() {
        assert!(parse_host_timestamp("2021-11-03 14:05:00").is_err());
        assert!(parse_host_timestamp("").is_err());
    }

    #[test]
    fn test_flexible_timestamp_layouts() {
        let expected = ts(2023, 1, 1, 10, 0, 0);
        assert_eq!(parse_flexible_timestamp("2023-01-01T10:00").unwrap(), expected);
        assert_eq!(parse_flexible_timestamp("2023-01-01 10:00").unwrap(), expected);
        assert_eq!(parse_flexible_timestamp("2023-01-01 10:00:00").unwrap(), expected);
        assert_eq!(parse_flexible_timestamp("2023-01-01T10:00:00Z").unwrap(), expected);
        assert_eq!(parse_flexible_timestamp("2023-01-01").unwrap(), ts(2023, 1, 1, 0, 0, 0));
        assert_eq!(parse_flexible_timestamp("2023/01/01 10:00").unwrap(), expected);
        assert_eq!(parse_flexible_timestamp("2023/01/01T10:00:00").unwrap(), expected);
        assert_eq!(parse_flexible_timestamp("2023/01/01").unwrap(), ts(2023, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_flexible_timestamp_offset_layouts() {
        let expected = ts(2023, 1, 1, 10, 0, 0);
        for text in [
            "2023-01-01T10:00+05:00",
            "2023-01-01 10:00+05:00",
            "2023-01-01T10:00:00+0500",
            "2023-01-01 10:00:00.000-03:00",
            "2023/01/01 10:00+05:00",
            "2023-01-01T10:00Z",
        ] {
            assert_eq!(parse_flexible_timestamp(text).unwrap(), expected, "{}", text);
        }
    }

    #[test]
    fn test_flexible_timestamp_drops_offset_without_converting() {
        let parsed = parse_flexible_timestamp("2023-01-01T10:00:00+05:00").unwrap();
        assert_eq!(parsed, ts(2023, 1, 1, 10, 0, 0));
    }

    #[test]
    fn test_flexible_timestamp_keeps_fraction() {
        let parsed = parse_flexible_timestamp("2023-01-01 10:00:00.250").unwrap();
        assert_eq!(parsed.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_flexible_timestamp_rejects_garbage() {
        assert!(parse_flexible_timestamp("yesterday").is_err());
        assert!(parse_flexible_timestamp("2023-13-01").is_err());
    }

    #[test]
    fn test_price_strips_symbol_and_separators() {
        assert_eq!(parse_price("$1,250.50").unwrap(), 1250.50);
        assert_eq!(parse_price("$1,200.00").unwrap(), 1200.0);
        assert_eq!(parse_price("85").unwrap(), 85.0);
        assert_eq!(parse_price(" $12,345,678.9 ").unwrap(), 12_345_678.9);
    }

    #[test]
    fn test_price_rejects_non_numeric() {
        assert!(parse_price("$abc").is_err());
        assert!(parse_price("$").is_err());
        assert!(parse_price("€100").is_err());
    }

    #[test]
    fn test_truncate_to_hour_zeroes_sub_hour_parts() {
        let parsed = parse_flexible_timestamp("2023-05-17 13:47:59.999").unwrap();
        assert_eq!(truncate_to_hour(parsed), ts(2023, 5, 17, 13, 0, 0));
        let on_the_hour = ts(2023, 5, 17, 13, 0, 0);
        assert_eq!(truncate_to_hour(on_the_hour), on_the_hour);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" x ")), Some("x"));
    }
}
