//! Filter types shared by the scalar and array predicates.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sea_query::{Alias, Expr, SimpleExpr};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::model::EnumMember;

use super::array::{
    ArrayElement, ArrayEmptyFilter, ArrayEqualFilter, ArrayNotContainsFilter, ArrayOverlapFilter,
};
use super::scalar::ScalarFilter;

/// Why a raw filter value was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid filter value: {value}")]
    InvalidValue { value: String },

    #[error("{token} is not a member of {enum_name}")]
    UnknownMember { token: String, enum_name: String },

    #[error("expected exactly one value, got {count}")]
    ExpectedSingle { count: usize },

    #[error("value does not fit the {operation} filter")]
    ValueMismatch { operation: &'static str },

    #[error("page {page} of {page_size} rows is out of range")]
    PageOutOfRange { page: usize, page_size: usize },
}

/// Filter input as it arrives from the query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawFilterValue {
    /// One value, possibly comma-separated.
    Single(String),
    /// A repeated query parameter.
    Many(Vec<String>),
}

impl RawFilterValue {
    /// Individual values, without comma splitting.
    pub fn values(&self) -> Vec<&str> {
        match self {
            RawFilterValue::Single(s) => vec![s.as_str()],
            RawFilterValue::Many(items) => items.iter().map(String::as_str).collect(),
        }
    }

    /// Values joined for display and flash messages.
    pub fn display(&self) -> String {
        match self {
            RawFilterValue::Single(s) => s.clone(),
            RawFilterValue::Many(items) => items.join(","),
        }
    }

    /// The single value, or an error if several were given.
    pub fn single(&self) -> Result<&str, FilterError> {
        match self {
            RawFilterValue::Single(s) => Ok(s.as_str()),
            RawFilterValue::Many(items) if items.len() == 1 => Ok(items[0].as_str()),
            RawFilterValue::Many(items) => Err(FilterError::ExpectedSingle { count: items.len() }),
        }
    }
}

impl From<&str> for RawFilterValue {
    fn from(value: &str) -> Self {
        RawFilterValue::Single(value.to_string())
    }
}

impl From<String> for RawFilterValue {
    fn from(value: String) -> Self {
        RawFilterValue::Single(value)
    }
}

impl From<Vec<&str>> for RawFilterValue {
    fn from(values: Vec<&str>) -> Self {
        RawFilterValue::Many(values.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for RawFilterValue {
    fn from(values: Vec<String>) -> Self {
        RawFilterValue::Many(values)
    }
}

/// A validated filter value, typed for its predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Member(EnumMember),
    /// Flag of an "empty" filter: `true` selects empty rows.
    Empty(bool),
    /// Normalised sequence for array predicates.
    Elements(Vec<ArrayElement>),
    /// Single element for array predicates.
    Element(ArrayElement),
}

/// Table-qualified column a filter applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Column expression for the query builder.
    pub fn expr(&self) -> Expr {
        Expr::col((Alias::new(&self.table), Alias::new(&self.column)))
    }

    /// Quoted `"table"."column"` for custom SQL fragments.
    pub fn quoted(&self) -> String {
        format!("{}.{}", quote_ident(&self.table), quote_ident(&self.column))
    }
}

/// Quote a SQL identifier, doubling embedded quotes.
pub(crate) fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Common behaviour of every filter predicate.
pub trait FilterPredicate {
    /// Column the predicate applies to.
    fn column(&self) -> &ColumnRef;

    /// Display name of the filtered column.
    fn name(&self) -> &str;

    /// Operation label shown next to the column name.
    fn operation(&self) -> &'static str;

    /// Choices for the filter UI, when the value set is closed.
    fn options(&self) -> Option<Vec<(String, String)>> {
        None
    }

    /// Validate and type a raw value.
    fn validate(&self, raw: &RawFilterValue) -> Result<FilterValue, FilterError>;

    /// Build the WHERE condition for a validated value.
    fn condition(&self, value: &FilterValue) -> Result<SimpleExpr, FilterError>;
}

/// Every filter the converter can produce.
#[derive(Debug, Clone)]
pub enum Filter {
    Scalar(ScalarFilter),
    ArrayOverlap(ArrayOverlapFilter),
    ArrayNotContains(ArrayNotContainsFilter),
    ArrayEqual(ArrayEqualFilter),
    ArrayEmpty(ArrayEmptyFilter),
}

impl Filter {
    /// Dispatch to the underlying predicate.
    pub fn predicate(&self) -> &dyn FilterPredicate {
        match self {
            Filter::Scalar(f) => f,
            Filter::ArrayOverlap(f) => f,
            Filter::ArrayNotContains(f) => f,
            Filter::ArrayEqual(f) => f,
            Filter::ArrayEmpty(f) => f,
        }
    }

    pub fn name(&self) -> &str {
        self.predicate().name()
    }

    pub fn operation(&self) -> &'static str {
        self.predicate().operation()
    }

    pub fn options(&self) -> Option<Vec<(String, String)>> {
        self.predicate().options()
    }

    pub fn validate(&self, raw: &RawFilterValue) -> Result<FilterValue, FilterError> {
        self.predicate().validate(raw)
    }

    pub fn condition(&self, value: &FilterValue) -> Result<SimpleExpr, FilterError> {
        self.predicate().condition(value)
    }

    /// Whether this is the "empty" variant, offered only for nullable columns.
    pub fn is_empty_filter(&self) -> bool {
        match self {
            Filter::ArrayEmpty(_) => true,
            Filter::Scalar(f) => f.is_empty_filter(),
            _ => false,
        }
    }
}

/// Parse the `1`/`0` flag of an "empty" filter.
pub(crate) fn parse_empty_flag(raw: &RawFilterValue) -> Result<FilterValue, FilterError> {
    match raw.single()?.trim() {
        "1" => Ok(FilterValue::Empty(true)),
        "0" => Ok(FilterValue::Empty(false)),
        other => Err(FilterError::InvalidValue {
            value: other.to_string(),
        }),
    }
}

/// Choices offered by every "empty" filter.
pub(crate) fn empty_options() -> Vec<(String, String)> {
    vec![
        ("1".to_string(), "Yes".to_string()),
        ("0".to_string(), "No".to_string()),
    ]
}
