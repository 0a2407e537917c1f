//! Array-column filter predicates.
//!
//! Overlap and not-contains compare the stored array as a set; equality
//! compares element by element, in order. Each predicate renders a
//! PostgreSQL condition and can also be evaluated against an in-memory
//! array with the same semantics.

use sea_query::{Cond, Expr, SimpleExpr};
use serde::Serialize;

use crate::model::{ArrayElementType, EnumMember};

use super::types::{
    ColumnRef, FilterError, FilterPredicate, FilterValue, RawFilterValue, empty_options,
    parse_empty_flag, quote_ident,
};

/// One entry of an array column, typed by the column's element type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ArrayElement {
    Member(EnumMember),
    Text(String),
}

impl ArrayElement {
    /// Value bound into SQL: the member name for enums, the text otherwise.
    pub fn sql_value(&self) -> &str {
        match self {
            ArrayElement::Member(member) => &member.name,
            ArrayElement::Text(text) => text,
        }
    }
}

/// Split a raw value into trimmed, non-empty tokens.
///
/// A single value is treated as comma-separated; repeated parameters are
/// split the same way, so `"RED,BLUE"` and `["RED", "BLUE"]` agree.
fn tokens(raw: &RawFilterValue) -> Vec<&str> {
    raw.values()
        .into_iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Resolve one token against the element type.
fn resolve(element_type: &ArrayElementType, token: &str) -> Result<ArrayElement, FilterError> {
    match element_type {
        ArrayElementType::Enum(enum_type) => enum_type
            .member(token)
            .cloned()
            .map(ArrayElement::Member)
            .ok_or_else(|| FilterError::UnknownMember {
                token: token.to_string(),
                enum_name: enum_type.sql_name.clone(),
            }),
        ArrayElementType::Text => Ok(ArrayElement::Text(token.to_string())),
    }
}

/// Normalise a raw value into an ordered sequence of elements.
///
/// Unknown enum tokens are rejected rather than dropped.
pub fn normalize(
    element_type: &ArrayElementType,
    raw: &RawFilterValue,
) -> Result<Vec<ArrayElement>, FilterError> {
    tokens(raw)
        .into_iter()
        .map(|token| resolve(element_type, token))
        .collect()
}

/// `ARRAY[$1, $2]::"type"[]` with its bound values.
fn array_literal(
    element_type: &ArrayElementType,
    elements: &[ArrayElement],
) -> (String, Vec<String>) {
    let placeholders: Vec<String> = (1..=elements.len()).map(|i| format!("${i}")).collect();
    let cast = match element_type {
        ArrayElementType::Enum(_) => quote_ident(element_type.sql_type()),
        ArrayElementType::Text => element_type.sql_type().to_string(),
    };
    let values = elements.iter().map(|e| e.sql_value().to_string()).collect();
    (format!("ARRAY[{}]::{cast}[]", placeholders.join(", ")), values)
}

fn expect_elements<'a>(
    value: &'a FilterValue,
    operation: &'static str,
) -> Result<&'a [ArrayElement], FilterError> {
    match value {
        FilterValue::Elements(elements) => Ok(elements),
        _ => Err(FilterError::ValueMismatch { operation }),
    }
}

/// Shared configuration of the array predicates.
#[derive(Debug, Clone)]
struct ArrayColumn {
    column: ColumnRef,
    name: String,
    element_type: ArrayElementType,
}

/// Matches rows whose array shares at least one element with the given set.
#[derive(Debug, Clone)]
pub struct ArrayOverlapFilter {
    inner: ArrayColumn,
}

impl ArrayOverlapFilter {
    pub fn new(column: ColumnRef, name: impl Into<String>, element_type: ArrayElementType) -> Self {
        Self {
            inner: ArrayColumn {
                column,
                name: name.into(),
                element_type,
            },
        }
    }

    /// Evaluate against a stored array.
    pub fn matches(&self, value: &FilterValue, stored: Option<&[ArrayElement]>) -> bool {
        let (Ok(wanted), Some(stored)) = (expect_elements(value, self.operation()), stored) else {
            return false;
        };
        stored.iter().any(|element| wanted.contains(element))
    }
}

impl FilterPredicate for ArrayOverlapFilter {
    fn column(&self) -> &ColumnRef {
        &self.inner.column
    }

    fn name(&self) -> &str {
        &self.inner.name
    }

    fn operation(&self) -> &'static str {
        "has any of"
    }

    fn options(&self) -> Option<Vec<(String, String)>> {
        self.inner.element_type.options()
    }

    fn validate(&self, raw: &RawFilterValue) -> Result<FilterValue, FilterError> {
        let elements = normalize(&self.inner.element_type, raw)?;
        if elements.is_empty() {
            return Err(FilterError::InvalidValue {
                value: raw.display(),
            });
        }
        Ok(FilterValue::Elements(elements))
    }

    fn condition(&self, value: &FilterValue) -> Result<SimpleExpr, FilterError> {
        let elements = expect_elements(value, self.operation())?;
        let (array, values) = array_literal(&self.inner.element_type, elements);
        Ok(Expr::cust_with_values(
            format!("{} && {array}", self.inner.column.quoted()),
            values,
        ))
    }
}

/// Matches rows whose array does not include the given element.
///
/// NULL and empty arrays always match.
#[derive(Debug, Clone)]
pub struct ArrayNotContainsFilter {
    inner: ArrayColumn,
}

impl ArrayNotContainsFilter {
    pub fn new(column: ColumnRef, name: impl Into<String>, element_type: ArrayElementType) -> Self {
        Self {
            inner: ArrayColumn {
                column,
                name: name.into(),
                element_type,
            },
        }
    }

    /// Evaluate against a stored array.
    pub fn matches(&self, value: &FilterValue, stored: Option<&[ArrayElement]>) -> bool {
        let FilterValue::Element(element) = value else {
            return false;
        };
        stored.is_none_or(|stored| !stored.contains(element))
    }
}

impl FilterPredicate for ArrayNotContainsFilter {
    fn column(&self) -> &ColumnRef {
        &self.inner.column
    }

    fn name(&self) -> &str {
        &self.inner.name
    }

    fn operation(&self) -> &'static str {
        "not contains"
    }

    fn options(&self) -> Option<Vec<(String, String)>> {
        self.inner.element_type.options()
    }

    fn validate(&self, raw: &RawFilterValue) -> Result<FilterValue, FilterError> {
        let token = raw.single()?.trim();
        if token.is_empty() {
            return Err(FilterError::InvalidValue {
                value: token.to_string(),
            });
        }
        resolve(&self.inner.element_type, token).map(FilterValue::Element)
    }

    fn condition(&self, value: &FilterValue) -> Result<SimpleExpr, FilterError> {
        let FilterValue::Element(element) = value else {
            return Err(FilterError::ValueMismatch {
                operation: self.operation(),
            });
        };
        let column = &self.inner.column;
        let (array, values) =
            array_literal(&self.inner.element_type, std::slice::from_ref(element));
        let cond = Cond::any().add(column.expr().is_null()).add(Expr::cust_with_values(
            format!("NOT ({} @> {array})", column.quoted()),
            values,
        ));
        Ok(cond.into())
    }
}

/// Matches rows whose array equals the given sequence, in order.
#[derive(Debug, Clone)]
pub struct ArrayEqualFilter {
    inner: ArrayColumn,
}

impl ArrayEqualFilter {
    pub fn new(column: ColumnRef, name: impl Into<String>, element_type: ArrayElementType) -> Self {
        Self {
            inner: ArrayColumn {
                column,
                name: name.into(),
                element_type,
            },
        }
    }

    /// Evaluate against a stored array.
    pub fn matches(&self, value: &FilterValue, stored: Option<&[ArrayElement]>) -> bool {
        let (Ok(wanted), Some(stored)) = (expect_elements(value, self.operation()), stored) else {
            return false;
        };
        stored == wanted
    }
}

impl FilterPredicate for ArrayEqualFilter {
    fn column(&self) -> &ColumnRef {
        &self.inner.column
    }

    fn name(&self) -> &str {
        &self.inner.name
    }

    fn operation(&self) -> &'static str {
        "equals"
    }

    fn options(&self) -> Option<Vec<(String, String)>> {
        self.inner.element_type.options()
    }

    fn validate(&self, raw: &RawFilterValue) -> Result<FilterValue, FilterError> {
        normalize(&self.inner.element_type, raw).map(FilterValue::Elements)
    }

    fn condition(&self, value: &FilterValue) -> Result<SimpleExpr, FilterError> {
        let elements = expect_elements(value, self.operation())?;
        let (array, values) = array_literal(&self.inner.element_type, elements);
        Ok(Expr::cust_with_values(
            format!("{} = {array}", self.inner.column.quoted()),
            values,
        ))
    }
}

/// Matches NULL or zero-length arrays (`1`), or the opposite (`0`).
///
/// Only offered for nullable array columns.
#[derive(Debug, Clone)]
pub struct ArrayEmptyFilter {
    column: ColumnRef,
    name: String,
}

impl ArrayEmptyFilter {
    pub fn new(column: ColumnRef, name: impl Into<String>) -> Self {
        Self {
            column,
            name: name.into(),
        }
    }

    /// Evaluate against a stored array.
    pub fn matches(&self, value: &FilterValue, stored: Option<&[ArrayElement]>) -> bool {
        let FilterValue::Empty(want_empty) = value else {
            return false;
        };
        let is_empty = stored.is_none_or(<[ArrayElement]>::is_empty);
        is_empty == *want_empty
    }
}

impl FilterPredicate for ArrayEmptyFilter {
    fn column(&self) -> &ColumnRef {
        &self.column
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn operation(&self) -> &'static str {
        "empty"
    }

    fn options(&self) -> Option<Vec<(String, String)>> {
        Some(empty_options())
    }

    fn validate(&self, raw: &RawFilterValue) -> Result<FilterValue, FilterError> {
        parse_empty_flag(raw)
    }

    fn condition(&self, value: &FilterValue) -> Result<SimpleExpr, FilterError> {
        let FilterValue::Empty(want_empty) = value else {
            return Err(FilterError::ValueMismatch {
                operation: self.operation(),
            });
        };
        let cardinality = format!("cardinality({})", self.column.quoted());
        let cond = if *want_empty {
            Cond::any()
                .add(self.column.expr().is_null())
                .add(Expr::cust(format!("{cardinality} = 0")))
        } else {
            Cond::all()
                .add(self.column.expr().is_not_null())
                .add(Expr::cust(format!("{cardinality} > 0")))
        };
        Ok(cond.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::EnumType;
    use sea_query::{Alias, Asterisk, PostgresQueryBuilder, Query};

    fn tag() -> ArrayElementType {
        ArrayElementType::Enum(EnumType::new(
            "tag",
            [("RED", "red"), ("YELLOW", "yellow"), ("BLUE", "blue")],
        ))
    }

    fn tags() -> ColumnRef {
        ColumnRef::new("account", "tags")
    }

    fn where_sql(expr: SimpleExpr) -> String {
        Query::select()
            .column(Asterisk)
            .from(Alias::new("account"))
            .and_where(expr)
            .to_string(PostgresQueryBuilder)
    }

    #[test]
    fn comma_separated_and_list_normalise_equally() {
        let from_string = normalize(&tag(), &"RED,BLUE".into()).unwrap();
        let from_list = normalize(&tag(), &vec!["RED", "BLUE"].into()).unwrap();
        assert_eq!(from_string, from_list);
        assert_eq!(from_string.len(), 2);
    }

    #[test]
    fn unknown_enum_token_is_rejected() {
        let err = normalize(&tag(), &"RED,GREEN".into()).unwrap_err();
        assert_eq!(
            err,
            FilterError::UnknownMember {
                token: "GREEN".to_string(),
                enum_name: "tag".to_string()
            }
        );
    }

    #[test]
    fn enum_tokens_match_names_not_values() {
        assert!(normalize(&tag(), &"red".into()).is_err());
    }

    #[test]
    fn text_tokens_are_trimmed() {
        let elements = normalize(&ArrayElementType::Text, &" note1 , note2,".into()).unwrap();
        assert_eq!(
            elements,
            vec![
                ArrayElement::Text("note1".to_string()),
                ArrayElement::Text("note2".to_string())
            ]
        );
    }

    #[test]
    fn overlap_sql_uses_array_operator() {
        let filter = ArrayOverlapFilter::new(tags(), "Tags", tag());
        let value = filter.validate(&"RED,YELLOW".into()).unwrap();
        let sql = where_sql(filter.condition(&value).unwrap());
        assert!(
            sql.contains("\"account\".\"tags\" && ARRAY['RED', 'YELLOW']::\"tag\"[]"),
            "{sql}"
        );
    }

    #[test]
    fn overlap_requires_a_value() {
        let filter = ArrayOverlapFilter::new(tags(), "Tags", tag());
        assert!(filter.validate(&"".into()).is_err());
    }

    #[test]
    fn not_contains_sql_includes_null_rows() {
        let filter = ArrayNotContainsFilter::new(tags(), "Tags", tag());
        let value = filter.validate(&"RED".into()).unwrap();
        let sql = where_sql(filter.condition(&value).unwrap());
        assert!(sql.contains("\"account\".\"tags\" IS NULL"), "{sql}");
        assert!(sql.contains("OR"), "{sql}");
        assert!(
            sql.contains("NOT (\"account\".\"tags\" @> ARRAY['RED']::\"tag\"[])"),
            "{sql}"
        );
    }

    #[test]
    fn not_contains_takes_one_value() {
        let filter = ArrayNotContainsFilter::new(tags(), "Tags", tag());
        assert_eq!(
            filter.validate(&vec!["RED", "BLUE"].into()),
            Err(FilterError::ExpectedSingle { count: 2 })
        );
    }

    #[test]
    fn equal_sql_for_empty_sequence() {
        let filter = ArrayEqualFilter::new(
            ColumnRef::new("account", "notes"),
            "Notes",
            ArrayElementType::Text,
        );
        let value = filter.validate(&RawFilterValue::Many(Vec::new())).unwrap();
        let sql = where_sql(filter.condition(&value).unwrap());
        assert!(
            sql.contains("\"account\".\"notes\" = ARRAY[]::text[]"),
            "{sql}"
        );
    }

    #[test]
    fn equal_wraps_single_scalar() {
        let filter = ArrayEqualFilter::new(tags(), "Tags", tag());
        let FilterValue::Elements(elements) = filter.validate(&"YELLOW".into()).unwrap() else {
            panic!("expected elements");
        };
        assert_eq!(elements.len(), 1);
    }

    #[test]
    fn empty_filter_sql() {
        let filter = ArrayEmptyFilter::new(tags(), "Tags");
        let sql = where_sql(filter.condition(&FilterValue::Empty(true)).unwrap());
        assert!(sql.contains("IS NULL"), "{sql}");
        assert!(sql.contains("cardinality(\"account\".\"tags\") = 0"), "{sql}");

        let sql = where_sql(filter.condition(&FilterValue::Empty(false)).unwrap());
        assert!(sql.contains("IS NOT NULL"), "{sql}");
        assert!(sql.contains("cardinality(\"account\".\"tags\") > 0"), "{sql}");
    }

    #[test]
    fn operation_labels() {
        assert_eq!(
            ArrayOverlapFilter::new(tags(), "Tags", tag()).operation(),
            "has any of"
        );
        assert_eq!(
            ArrayNotContainsFilter::new(tags(), "Tags", tag()).operation(),
            "not contains"
        );
        assert_eq!(
            ArrayEqualFilter::new(tags(), "Tags", tag()).operation(),
            "equals"
        );
    }

    #[test]
    fn options_follow_element_type() {
        let enum_filter = ArrayOverlapFilter::new(tags(), "Tags", tag());
        assert_eq!(enum_filter.options().map(|o| o.len()), Some(3));

        let text_filter = ArrayOverlapFilter::new(
            ColumnRef::new("account", "notes"),
            "Notes",
            ArrayElementType::Text,
        );
        assert!(text_filter.options().is_none());
    }

    #[test]
    fn mismatched_value_is_an_error() {
        let filter = ArrayOverlapFilter::new(tags(), "Tags", tag());
        assert!(filter.condition(&FilterValue::Boolean(true)).is_err());
    }
}
