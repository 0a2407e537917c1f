#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Array-column filter tests against the fixture accounts.

use govuk_admin::filter::{
    ArrayElement, ArrayEmptyFilter, ArrayEqualFilter, ArrayNotContainsFilter, ArrayOverlapFilter,
    ColumnRef, FilterConverter, FilterError, FilterPredicate, FilterSet, FilterValue, ListArgs,
    ListQueryBuilder, QueryArgs, RawFilterValue, normalize,
};
use govuk_admin::model::{ArrayElementType, ColumnDef, ColumnKind, EnumType, ModelDef};
use govuk_admin_test_utils::{FIXTURE_NOTES, FIXTURE_TAGS, account_model_json, colour_enum_json};

fn colour() -> ArrayElementType {
    ArrayElementType::Enum(serde_json::from_value::<EnumType>(colour_enum_json()).unwrap())
}

fn tags() -> ColumnRef {
    ColumnRef::new("account", "tags")
}

/// Stored `tags` of each fixture row.
fn stored_rows() -> Vec<Vec<ArrayElement>> {
    FIXTURE_TAGS
        .iter()
        .map(|tags| normalize(&colour(), &RawFilterValue::from(tags.to_vec())).unwrap())
        .collect()
}

/// 1-based ids of the rows a predicate keeps.
fn matching(predicate: impl Fn(Option<&[ArrayElement]>) -> bool) -> Vec<usize> {
    stored_rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| predicate(Some(row.as_slice())))
        .map(|(i, _)| i + 1)
        .collect()
}

fn notes() -> ColumnRef {
    ColumnRef::new("account", "notes")
}

/// 1-based ids of the rows whose stored `notes` a predicate keeps.
fn matching_notes(predicate: impl Fn(Option<&[ArrayElement]>) -> bool) -> Vec<usize> {
    FIXTURE_NOTES
        .iter()
        .map(|notes| {
            notes
                .iter()
                .map(|note| ArrayElement::Text(note.to_string()))
                .collect::<Vec<_>>()
        })
        .enumerate()
        .filter(|(_, row)| predicate(Some(row.as_slice())))
        .map(|(i, _)| i + 1)
        .collect()
}

#[test]
fn test_overlap_single_value() {
    let filter = ArrayOverlapFilter::new(tags(), "Tags", colour());
    let value = filter.validate(&"RED".into()).unwrap();
    assert_eq!(matching(|row| filter.matches(&value, row)), vec![1, 3]);
}

#[test]
fn test_overlap_two_values() {
    let filter = ArrayOverlapFilter::new(tags(), "Tags", colour());
    let value = filter.validate(&"RED,YELLOW".into()).unwrap();
    assert_eq!(matching(|row| filter.matches(&value, row)), vec![1, 2, 3]);

    let from_list = filter.validate(&vec!["RED", "YELLOW"].into()).unwrap();
    assert_eq!(value, from_list);
}

#[test]
fn test_not_contains_keeps_empty_rows() {
    let filter = ArrayNotContainsFilter::new(tags(), "Tags", colour());
    let value = filter.validate(&"RED".into()).unwrap();
    assert_eq!(matching(|row| filter.matches(&value, row)), vec![2, 4, 5, 6]);
    assert!(filter.matches(&value, None), "NULL arrays do not contain RED");
}

#[test]
fn test_not_contains_rejects_several_values() {
    let filter = ArrayNotContainsFilter::new(tags(), "Tags", colour());
    assert_eq!(
        filter.validate(&vec!["RED", "BLUE"].into()),
        Err(FilterError::ExpectedSingle { count: 2 })
    );
}

#[test]
fn test_equal_is_ordered() {
    let filter = ArrayEqualFilter::new(tags(), "Tags", colour());

    let value = filter.validate(&"RED,BLUE".into()).unwrap();
    assert_eq!(matching(|row| filter.matches(&value, row)), vec![1]);

    let reversed = filter.validate(&"BLUE,RED".into()).unwrap();
    assert!(matching(|row| filter.matches(&reversed, row)).is_empty());
}

#[test]
fn test_equal_empty_sequence_matches_empty_rows() {
    let filter = ArrayEqualFilter::new(tags(), "Tags", colour());
    let value = filter.validate(&RawFilterValue::Many(Vec::new())).unwrap();
    assert_eq!(value, FilterValue::Elements(Vec::new()));
    assert_eq!(matching(|row| filter.matches(&value, row)), vec![5, 6]);
}

#[test]
fn test_empty_filter() {
    let filter = ArrayEmptyFilter::new(tags(), "Tags");
    let empty = filter.validate(&"1".into()).unwrap();
    let not_empty = filter.validate(&"0".into()).unwrap();
    assert_eq!(matching(|row| filter.matches(&empty, row)), vec![5, 6]);
    assert_eq!(matching(|row| filter.matches(&not_empty, row)), vec![1, 2, 3, 4]);
    assert!(filter.matches(&empty, None));
    assert!(filter.validate(&"maybe".into()).is_err());
}

#[test]
fn test_text_overlap_splits_and_trims_tokens() {
    let filter = ArrayOverlapFilter::new(notes(), "Notes", ArrayElementType::Text);

    let value = filter.validate(&" urgent ".into()).unwrap();
    assert_eq!(value, FilterValue::Elements(vec![ArrayElement::Text("urgent".into())]));
    assert_eq!(matching_notes(|row| filter.matches(&value, row)), vec![1, 2]);

    let value = filter.validate(&"urgent,  paid in full".into()).unwrap();
    assert_eq!(matching_notes(|row| filter.matches(&value, row)), vec![1, 2, 5, 6]);
    assert!(!filter.matches(&value, None));

    assert!(filter.validate(&" , ".into()).is_err());
}

#[test]
fn test_text_not_contains() {
    let filter = ArrayNotContainsFilter::new(notes(), "Notes", ArrayElementType::Text);

    let value = filter.validate(&"  call back ".into()).unwrap();
    assert_eq!(value, FilterValue::Element(ArrayElement::Text("call back".into())));
    assert_eq!(matching_notes(|row| filter.matches(&value, row)), vec![2, 4, 5]);
    assert!(filter.matches(&value, None));

    // A single value is one note even when it holds a comma
    let value = filter.validate(&"urgent, call back".into()).unwrap();
    assert_eq!(matching_notes(|row| filter.matches(&value, row)), vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_text_equal_is_ordered() {
    let filter = ArrayEqualFilter::new(notes(), "Notes", ArrayElementType::Text);

    let value = filter.validate(&"paid in full, call back".into()).unwrap();
    assert_eq!(matching_notes(|row| filter.matches(&value, row)), vec![6]);

    let reversed = filter.validate(&vec!["call back", "paid in full"].into()).unwrap();
    assert!(matching_notes(|row| filter.matches(&reversed, row)).is_empty());

    let single = filter.validate(&"paid in full".into()).unwrap();
    assert_eq!(matching_notes(|row| filter.matches(&single, row)), vec![5]);

    let empty = filter.validate(&RawFilterValue::Many(Vec::new())).unwrap();
    assert_eq!(matching_notes(|row| filter.matches(&empty, row)), vec![4]);
}

#[test]
fn test_unknown_member_is_rejected() {
    let filter = ArrayOverlapFilter::new(tags(), "Tags", colour());
    assert_eq!(
        filter.validate(&"RED,GREEN".into()),
        Err(FilterError::UnknownMember {
            token: "GREEN".to_string(),
            enum_name: "colour".to_string(),
        })
    );
}

#[test]
fn test_options_for_enum_and_text() {
    let enum_filter = ArrayOverlapFilter::new(tags(), "Tags", colour());
    let options = enum_filter.options().unwrap();
    assert_eq!(options[0], ("RED".to_string(), "red".to_string()));
    assert_eq!(options.len(), 3);

    let text_filter = ArrayOverlapFilter::new(
        ColumnRef::new("account", "notes"),
        "Notes",
        ArrayElementType::Text,
    );
    assert!(text_filter.options().is_none());
}

#[test]
fn test_empty_variant_only_for_nullable_columns() {
    let converter = FilterConverter::new();

    let nullable = ColumnDef::new("tags", ColumnKind::Array(colour())).nullable();
    let filters = converter.convert("account", &nullable, "Tags");
    let operations: Vec<&str> = filters.iter().map(|f| f.operation()).collect();
    assert_eq!(operations, vec!["has any of", "not contains", "equals", "empty"]);

    let required = ColumnDef::new("tags", ColumnKind::Array(colour()));
    let filters = converter.convert("account", &required, "Tags");
    assert!(filters.iter().all(|f| !f.is_empty_filter()));
    assert_eq!(filters.len(), 3);
}

#[test]
fn test_query_string_to_sql() {
    let model: ModelDef = serde_json::from_value(account_model_json()).unwrap();
    let filters = FilterSet::for_model(&model, &FilterConverter::new());
    let overlap = filters
        .iter()
        .position(|f| f.name() == "Tags" && f.operation() == "has any of")
        .unwrap();

    let query = QueryArgs::parse(&format!("flt0_{overlap}=RED%2CYELLOW"));
    let (args, messages) = ListArgs::from_query(&query, &filters);
    assert!(messages.is_empty());
    assert_eq!(args.filters.len(), 1);

    let sql = ListQueryBuilder::new(&model, &filters, &args).build(20).unwrap();
    assert!(
        sql.contains("\"account\".\"tags\" && ARRAY['RED', 'YELLOW']::\"colour\"[]"),
        "{sql}"
    );
}

#[test]
fn test_invalid_value_is_flashed_not_applied() {
    let model: ModelDef = serde_json::from_value(account_model_json()).unwrap();
    let filters = FilterSet::for_model(&model, &FilterConverter::new());
    let equal = filters
        .iter()
        .position(|f| f.name() == "Tags" && f.operation() == "equals")
        .unwrap();

    let query = QueryArgs::parse(&format!("flt0_{equal}=RED,PURPLE"));
    let (args, messages) = ListArgs::from_query(&query, &filters);
    assert!(args.filters.is_empty());
    assert_eq!(messages, vec!["Invalid Filter Value: RED,PURPLE".to_string()]);
}
