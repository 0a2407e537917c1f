//! List view query-string arguments.
//!
//! Raw parameters are normalised (blank filters dropped, GOV.UK date parts
//! combined) into a fresh [`QueryArgs`] and resolved against a
//! [`FilterSet`]. The request's own parameters are never rewritten.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use super::converter::FilterSet;
use super::types::{FilterValue, RawFilterValue};

/// Matches `flt{position}_{key}` filter parameters.
#[allow(clippy::expect_used)]
static FILTER_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^flt(\d+)_(.+)$").expect("valid regex literal"));

const DATE_PARTS: [&str; 3] = ["-day", "-month", "-year"];
const TIME_PARTS: [&str; 3] = ["-hour", "-minute", "-second"];

/// Ordered multimap of query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryArgs {
    entries: Vec<(String, Vec<String>)>,
}

impl QueryArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw query string (without the leading `?`).
    pub fn parse(query: &str) -> Self {
        let mut args = Self::new();
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            args.push(decode_component(key), decode_component(value));
        }
        args
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut args = Self::new();
        for (key, value) in pairs {
            args.push(key.into(), value.into());
        }
        args
    }

    /// Append a value, keeping first-seen key order.
    pub fn push(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Replace every value of `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.remove(&key);
        self.entries.push((key, vec![value.into()]));
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// First value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
            .unwrap_or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as a query string, repeated keys emitted once per value.
    pub fn to_query_string(&self) -> String {
        self.entries
            .iter()
            .flat_map(|(key, values)| {
                values.iter().map(move |value| {
                    format!(
                        "{}={}",
                        urlencoding::encode(key),
                        urlencoding::encode(value)
                    )
                })
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn decode_component(component: &str) -> String {
    let spaced = component.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Drop blank filter parameters and combine GOV.UK date/datetime parts.
///
/// `fltN_K-day`, `-month` and `-year` become `fltN_K=YYYY-MM-DD` when all
/// three are filled in. With `-hour`, `-minute` and `-second` also present
/// the result is `YYYY-MM-DD HH:MM:SS`, provided all six are filled in.
/// Incomplete dates are left as their parts and do not resolve to a filter.
pub fn normalize(raw: &QueryArgs) -> QueryArgs {
    let mut args = QueryArgs::new();
    for (key, values) in &raw.entries {
        if key.starts_with("flt") && values.iter().all(|v| is_blank(v)) {
            continue;
        }
        args.entries.push((key.clone(), values.clone()));
    }

    for key in raw.keys() {
        if !key.starts_with("flt") {
            continue;
        }
        let Some(base) = key.strip_suffix("-day") else {
            continue;
        };
        let part = |suffix: &str| raw.get(&format!("{base}{suffix}")).map(str::trim);

        let (Some(day), Some(month), Some(year)) = (part("-day"), part("-month"), part("-year"))
        else {
            continue;
        };

        let is_datetime = TIME_PARTS
            .iter()
            .all(|suffix| raw.contains(&format!("{base}{suffix}")));

        let combined = if is_datetime {
            let hour = part("-hour").unwrap_or_default();
            let minute = part("-minute").unwrap_or_default();
            let second = part("-second").unwrap_or_default();
            if [day, month, year, hour, minute, second]
                .iter()
                .any(|p| p.is_empty())
            {
                continue;
            }
            format!("{year}-{month:0>2}-{day:0>2} {hour:0>2}:{minute:0>2}:{second:0>2}")
        } else {
            if [day, month, year].iter().any(|p| p.is_empty()) {
                continue;
            }
            format!("{year}-{month:0>2}-{day:0>2}")
        };

        let time_parts: &[&str] = if is_datetime { &TIME_PARTS } else { &[] };
        for suffix in DATE_PARTS.iter().chain(time_parts) {
            args.remove(&format!("{base}{suffix}"));
        }
        debug!(key = base, value = %combined, "combined date filter parts");
        args.set(base, combined);
    }

    args
}

/// A validated filter applied to the list.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveFilter {
    /// Position from the `flt{position}_` prefix.
    pub position: usize,
    /// Index into the filter set.
    pub index: usize,
    pub label: String,
    pub operation: &'static str,
    /// Value as submitted, for re-rendering links.
    pub raw: RawFilterValue,
    #[serde(skip)]
    pub value: FilterValue,
}

/// Paging, sorting, searching and filtering state of a list request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListArgs {
    /// Zero-indexed page.
    pub page: usize,
    pub page_size: Option<usize>,
    /// Index of the sort column.
    pub sort: Option<usize>,
    pub desc: bool,
    pub search: Option<String>,
    pub filters: Vec<ActiveFilter>,
}

/// Message flashed for a filter value that failed validation.
pub fn invalid_value_message(value: &str) -> String {
    format!("Invalid Filter Value: {value}")
}

fn parse_number(args: &QueryArgs, key: &str) -> Option<usize> {
    let value = args.get(key)?.trim();
    match value.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(key, value, "ignoring non-numeric list argument");
            None
        }
    }
}

impl ListArgs {
    /// Resolve raw query parameters against a filter set.
    ///
    /// Returns the arguments and one message per rejected filter value.
    pub fn from_query(raw: &QueryArgs, filters: &FilterSet) -> (Self, Vec<String>) {
        let args = normalize(raw);
        let mut messages = Vec::new();
        let mut active = Vec::new();

        for key in args.keys() {
            let Some(captures) = FILTER_KEY.captures(key) else {
                continue;
            };
            let (Ok(position), Some(arg_key)) =
                (captures[1].parse::<usize>(), captures.get(2).map(|m| m.as_str()))
            else {
                continue;
            };
            let Some((index, filter)) = filters.lookup(arg_key) else {
                debug!(key, "unknown filter argument");
                continue;
            };

            let raw_value = match args.get_all(key) {
                [single] => RawFilterValue::Single(single.clone()),
                many => RawFilterValue::Many(many.to_vec()),
            };

            match filter.validate(&raw_value) {
                Ok(value) => active.push(ActiveFilter {
                    position,
                    index,
                    label: filter.name().to_string(),
                    operation: filter.operation(),
                    raw: raw_value,
                    value,
                }),
                Err(e) => {
                    warn!(key, error = %e, "rejected filter value");
                    messages.push(invalid_value_message(&raw_value.display()));
                }
            }
        }

        active.sort_by_key(|f| f.position);

        let search = args
            .get("search")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let list_args = Self {
            page: parse_number(&args, "page").unwrap_or(0),
            page_size: parse_number(&args, "page_size").filter(|n| *n > 0),
            sort: parse_number(&args, "sort"),
            desc: args.get("desc").is_some_and(|v| v == "1"),
            search,
            filters: active,
        };
        (list_args, messages)
    }

    /// Build a list URL under `base` for this state.
    ///
    /// `skip` leaves out the filter at that offset of `filters`; the rest
    /// are renumbered from zero. The page size is only emitted when it
    /// differs from `default_page_size`.
    fn url(
        &self,
        base: &str,
        page: Option<usize>,
        skip: Option<usize>,
        with_search: bool,
        default_page_size: usize,
    ) -> String {
        let mut args = QueryArgs::new();

        for (position, filter) in self
            .filters
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .map(|(_, f)| f)
            .enumerate()
        {
            let key = format!("flt{position}_{}", FilterSet::arg_key(filter.index));
            for value in filter.raw.values() {
                args.push(key.clone(), value.to_string());
            }
        }

        if let Some(sort) = self.sort {
            args.set("sort", sort.to_string());
        }
        if self.desc {
            args.set("desc", "1");
        }
        if with_search && let Some(search) = &self.search {
            args.set("search", search.clone());
        }
        if let Some(page_size) = self.page_size
            && page_size != default_page_size
        {
            args.set("page_size", page_size.to_string());
        }
        if let Some(page) = page
            && page > 0
        {
            args.set("page", page.to_string());
        }

        if args.is_empty() {
            base.to_string()
        } else {
            format!("{base}?{}", args.to_query_string())
        }
    }

    /// URL of `page` (zero-indexed), keeping every other argument.
    pub fn page_url(&self, base: &str, page: usize, default_page_size: usize) -> String {
        self.url(base, Some(page), None, true, default_page_size)
    }

    /// URL with the filter at offset `filter_position` removed.
    ///
    /// Returns to the first page.
    pub fn remove_filter_url(
        &self,
        base: &str,
        filter_position: usize,
        default_page_size: usize,
    ) -> String {
        self.url(base, None, Some(filter_position), true, default_page_size)
    }

    /// URL with the search term removed.
    pub fn remove_search_url(&self, base: &str, default_page_size: usize) -> String {
        self.url(base, None, None, false, default_page_size)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_decodes_components() {
        let args = QueryArgs::parse("search=red+car&flt0_1=a%2Cb&flt0_1=c&empty=");
        assert_eq!(args.get("search"), Some("red car"));
        assert_eq!(args.get_all("flt0_1"), ["a,b".to_string(), "c".to_string()]);
        assert_eq!(args.get("empty"), Some(""));
        assert!(args.get("missing").is_none());
    }

    #[test]
    fn blank_filters_are_dropped() {
        let raw = QueryArgs::from_pairs([("flt0_1", " "), ("search", ""), ("flt1_2", "x")]);
        let args = normalize(&raw);
        assert!(!args.contains("flt0_1"));
        assert!(args.contains("search"));
        assert_eq!(args.get("flt1_2"), Some("x"));
    }

    #[test]
    fn date_parts_are_combined_and_padded() {
        let raw = QueryArgs::from_pairs([
            ("flt0_3-day", "5"),
            ("flt0_3-month", "3"),
            ("flt0_3-year", "2024"),
        ]);
        let args = normalize(&raw);
        assert_eq!(args.get("flt0_3"), Some("2024-03-05"));
        assert!(!args.contains("flt0_3-day"));
        assert!(!args.contains("flt0_3-month"));
        assert!(!args.contains("flt0_3-year"));
    }

    #[test]
    fn datetime_parts_are_combined() {
        let raw = QueryArgs::from_pairs([
            ("flt2_7-day", "1"),
            ("flt2_7-month", "12"),
            ("flt2_7-year", "2023"),
            ("flt2_7-hour", "9"),
            ("flt2_7-minute", "5"),
            ("flt2_7-second", "0"),
        ]);
        let args = normalize(&raw);
        assert_eq!(args.get("flt2_7"), Some("2023-12-01 09:05:00"));
        assert!(!args.contains("flt2_7-hour"));
    }

    #[test]
    fn incomplete_datetime_is_not_combined() {
        let raw = QueryArgs::from_pairs([
            ("flt2_7-day", "1"),
            ("flt2_7-month", "12"),
            ("flt2_7-year", "2023"),
            ("flt2_7-hour", "9"),
            ("flt2_7-minute", ""),
            ("flt2_7-second", "0"),
        ]);
        let args = normalize(&raw);
        assert!(!args.contains("flt2_7"));
        assert!(!args.contains("flt2_7-minute"));
    }

    #[test]
    fn incomplete_date_is_not_combined() {
        let raw = QueryArgs::from_pairs([("flt0_3-day", "5"), ("flt0_3-year", "2024")]);
        let args = normalize(&raw);
        assert!(!args.contains("flt0_3"));
    }

    #[test]
    fn normalize_leaves_input_untouched() {
        let raw = QueryArgs::from_pairs([("flt0_1", ""), ("page", "2")]);
        let before = raw.clone();
        let _ = normalize(&raw);
        assert_eq!(raw, before);
    }

    #[test]
    fn query_string_round_trips_spaces_and_commas() {
        let args = QueryArgs::from_pairs([("search", "a b"), ("flt0_1", "RED,BLUE")]);
        let rendered = args.to_query_string();
        assert_eq!(rendered, "search=a%20b&flt0_1=RED%2CBLUE");
        assert_eq!(QueryArgs::parse(&rendered), args);
    }
}
