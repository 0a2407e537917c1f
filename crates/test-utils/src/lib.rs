//! govuk-admin test utilities.
//!
//! Fixtures shared by the integration tests: an `account` model with a
//! `colour[]` tag column, the rows the array filter tests run against,
//! and assertion helpers for rendered HTML.

use serde_json::{Map, Value as JsonValue, json};

/// Members of the `colour` enum as `(name, display value)` pairs.
pub const COLOUR_MEMBERS: [(&str, &str); 3] =
    [("RED", "red"), ("BLUE", "blue"), ("YELLOW", "yellow")];

/// JSON definition of the `account` model.
///
/// Columns cover every widget kind: text, integer, boolean, enum, date,
/// datetime, a nullable `colour[]` array and a nullable `text[]` array.
pub fn account_model_json() -> JsonValue {
    let colour = colour_enum_json();
    json!({
        "table": "account",
        "columns": [
            {"name": "id", "kind": "integer"},
            {"name": "name", "kind": "string"},
            {"name": "age", "kind": "integer", "nullable": true},
            {"name": "active", "kind": "boolean"},
            {"name": "favourite", "kind": "enum", "sql_name": colour["sql_name"], "members": colour["members"], "nullable": true},
            {"name": "born_on", "kind": "date", "nullable": true},
            {"name": "last_logged_in_at", "kind": "datetime", "nullable": true},
            {"name": "tags", "kind": "array", "element": "enum", "sql_name": colour["sql_name"], "members": colour["members"], "nullable": true},
            {"name": "notes", "kind": "array", "element": "text", "nullable": true}
        ],
        "relationships": [
            {"name": "team", "target": "team", "uselist": false},
            {"name": "projects", "target": "project", "uselist": true}
        ],
        "searchable": ["name"],
        "filterable": ["name", "age", "active", "favourite", "tags"]
    })
}

/// JSON form of the `colour` enum type.
pub fn colour_enum_json() -> JsonValue {
    let members: Vec<JsonValue> = COLOUR_MEMBERS
        .iter()
        .map(|(name, value)| json!({"name": name, "value": value}))
        .collect();
    json!({"sql_name": "colour", "members": members})
}

/// `tags` of the six fixture accounts, by row.
pub const FIXTURE_TAGS: [&[&str]; 6] = [
    &["RED", "BLUE"],
    &["YELLOW"],
    &["RED", "YELLOW"],
    &["BLUE"],
    &[],
    &[],
];

/// `notes` of the six fixture accounts, by row.
///
/// The two rows with no tags keep distinct notes.
pub const FIXTURE_NOTES: [&[&str]; 6] = [
    &["call back", "urgent"],
    &["urgent"],
    &["call back"],
    &[],
    &["paid in full"],
    &["paid in full", "call back"],
];

/// The six fixture account rows, keyed by column name.
pub fn account_rows() -> Vec<Map<String, JsonValue>> {
    FIXTURE_TAGS
        .iter()
        .enumerate()
        .map(|(i, tags)| {
            let row = json!({
                "id": i + 1,
                "name": format!("Account {}", i + 1),
                "age": if i % 2 == 0 { json!(30 + i) } else { JsonValue::Null },
                "active": i % 2 == 0,
                "favourite": tags.first().copied(),
                "born_on": null,
                "last_logged_in_at": format!("2024-03-0{}T09:07:30.123456", i + 1),
                "tags": tags,
                "notes": FIXTURE_NOTES[i],
            });
            match row {
                JsonValue::Object(map) => map,
                _ => Map::new(),
            }
        })
        .collect()
}

/// Assertion helpers for rendered output.
pub mod assert {
    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to not contain '{needle}'\nActual: {haystack}"
        );
    }
}
