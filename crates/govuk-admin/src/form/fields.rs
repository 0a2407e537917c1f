//! Submitted value processing for composite fields.

use chrono::{NaiveDate, NaiveDateTime};

use super::types::ValidationError;

/// Textarea editing a list of strings, one per line.
pub struct ArrayTextArea;

impl ArrayTextArea {
    /// Render a stored list as newline-separated text, skipping empty items.
    pub fn display(items: &[String]) -> String {
        items
            .iter()
            .filter(|item| !item.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Turn submitted text into trimmed, non-blank lines.
    pub fn process(submitted: Option<&str>) -> Vec<String> {
        submitted
            .map(|text| {
                text.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Join submitted parts for parsing, `None` when every part is blank.
fn joined(parts: &[String]) -> Option<String> {
    if parts.iter().all(|p| p.trim().is_empty()) {
        return None;
    }
    Some(
        parts
            .iter()
            .map(|p| p.trim())
            .collect::<Vec<_>>()
            .join(" "),
    )
}

/// Parse day/month/year parts with `format`.
pub fn parse_date_parts(
    name: &str,
    parts: &[String],
    format: &str,
) -> Result<Option<NaiveDate>, ValidationError> {
    let Some(value) = joined(parts) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(&value, format)
        .map(Some)
        .map_err(|_| ValidationError::field(name, "Not a valid date value."))
}

/// Parse day/month/year/hour/minute/second parts with `format`.
pub fn parse_datetime_parts(
    name: &str,
    parts: &[String],
    format: &str,
) -> Result<Option<NaiveDateTime>, ValidationError> {
    let Some(value) = joined(parts) else {
        return Ok(None);
    };
    NaiveDateTime::parse_from_str(&value, format)
        .map(Some)
        .map_err(|_| ValidationError::field(name, "Not a valid datetime value."))
}
