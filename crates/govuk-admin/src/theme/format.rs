//! List view cell formatters.

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

use crate::model::{ArrayElementType, ColumnKind};

/// Display format of datetime cells.
pub const DATETIME_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a datetime without sub-second digits; `None` renders empty.
pub fn format_datetime(value: Option<&NaiveDateTime>) -> String {
    value
        .map(|dt| dt.format(DATETIME_DISPLAY_FORMAT).to_string())
        .unwrap_or_default()
}

/// Parse the datetime shapes rows arrive in.
pub(crate) fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Render one cell of a list row.
///
/// Enum members show their display value, datetimes lose their
/// sub-second part and null renders as an empty string.
pub fn format_cell(kind: &ColumnKind, value: &Value) -> String {
    match (kind, value) {
        (_, Value::Null) => String::new(),
        (ColumnKind::Enum(enum_type), Value::String(name)) => enum_type
            .member(name)
            .map(|m| m.value.clone())
            .unwrap_or_else(|| name.clone()),
        (ColumnKind::DateTime, Value::String(raw)) => match parse_datetime(raw) {
            Some(dt) => format_datetime(Some(&dt)),
            None => raw.clone(),
        },
        (ColumnKind::Array(element_type), Value::Array(items)) => items
            .iter()
            .map(|item| match (element_type, item) {
                (ArrayElementType::Enum(enum_type), Value::String(name)) => enum_type
                    .member(name)
                    .map(|m| m.value.clone())
                    .unwrap_or_else(|| name.clone()),
                (_, Value::String(text)) => text.clone(),
                (_, other) => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        (_, Value::String(text)) => text.clone(),
        (_, other) => other.to_string(),
    }
}
