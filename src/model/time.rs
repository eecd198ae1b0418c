//! Time formatting - Renders stored time values with strftime formats.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use super::RowError;

/// Default time format: `2024-01-31 13:45:00`.
pub const DATETIME: &str = "%Y-%m-%d %H:%M:%S";

const PARSE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

fn parse_time(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.naive_utc()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.naive_utc());
            }
            if let Ok(secs) = s.parse::<i64>() {
                return DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc());
            }
            PARSE_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .and_then(|date| date.and_hms_opt(0, 0, 0))
                })
        }
        _ => None,
    }
}

/// Render a stored time value (Unix seconds or a date string) with `format`.
pub fn format_time_value(column: &str, value: &Value, format: &str) -> Result<String, RowError> {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(RowError::InvalidTimeFormat(format.to_string()));
    }

    let time = parse_time(value).ok_or_else(|| RowError::InvalidTime {
        column: column.to_string(),
        value: value.to_string(),
    })?;

    let mut out = String::new();
    write!(out, "{}", time.format_with_items(items.iter()))
        .map_err(|_| RowError::InvalidTimeFormat(format.to_string()))?;
    Ok(out)
}
