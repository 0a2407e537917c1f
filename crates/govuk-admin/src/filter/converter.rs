//! Column kind to filter set conversion.
//!
//! "in list", "not in list" and "between" filters are never offered, and
//! the "empty" filter only appears for nullable columns.

use serde::Serialize;
use tracing::debug;

use crate::model::{ArrayElementType, ColumnDef, ColumnKind, ModelDef};

use super::array::{ArrayEmptyFilter, ArrayEqualFilter, ArrayNotContainsFilter, ArrayOverlapFilter};
use super::scalar::{ScalarFilter, ScalarOp, ScalarType};
use super::types::{ColumnRef, Filter};

const STRING_OPS: &[ScalarOp] = &[
    ScalarOp::Like,
    ScalarOp::NotLike,
    ScalarOp::Equal,
    ScalarOp::NotEqual,
    ScalarOp::Empty,
];

const KEY_OPS: &[ScalarOp] = &[ScalarOp::Equal, ScalarOp::NotEqual, ScalarOp::Empty];

const ORDERED_OPS: &[ScalarOp] = &[
    ScalarOp::Equal,
    ScalarOp::NotEqual,
    ScalarOp::Greater,
    ScalarOp::Smaller,
    ScalarOp::Empty,
];

const BOOL_OPS: &[ScalarOp] = &[ScalarOp::Equal, ScalarOp::NotEqual];

/// Builds the filters offered for each column.
#[derive(Debug, Clone, Default)]
pub struct FilterConverter;

impl FilterConverter {
    pub fn new() -> Self {
        Self
    }

    /// Filters for one column of `table`, labelled `name`.
    pub fn convert(&self, table: &str, column: &ColumnDef, name: &str) -> Vec<Filter> {
        let column_ref = ColumnRef::new(table, &column.name);

        let (ops, value_type) = match &column.kind {
            ColumnKind::String | ColumnKind::Text => (STRING_OPS, ScalarType::Text),
            ColumnKind::Uuid => (KEY_OPS, ScalarType::Uuid),
            ColumnKind::Integer => (ORDERED_OPS, ScalarType::Integer),
            ColumnKind::Float => (ORDERED_OPS, ScalarType::Float),
            ColumnKind::Boolean => (BOOL_OPS, ScalarType::Boolean),
            ColumnKind::Enum(enum_type) => (KEY_OPS, ScalarType::Enum(enum_type.clone())),
            ColumnKind::Date => (ORDERED_OPS, ScalarType::Date),
            ColumnKind::DateTime => (ORDERED_OPS, ScalarType::DateTime),
            ColumnKind::Time => (ORDERED_OPS, ScalarType::Time),
            ColumnKind::Array(element_type) => {
                return self.convert_array(column_ref, column.nullable, name, element_type);
            }
        };

        let filters: Vec<Filter> = ops
            .iter()
            .filter(|op| column.nullable || **op != ScalarOp::Empty)
            .map(|op| {
                Filter::Scalar(ScalarFilter::new(
                    column_ref.clone(),
                    name,
                    *op,
                    value_type.clone(),
                ))
            })
            .collect();

        debug!(
            column = %column.name,
            kind = column.kind.type_name(),
            count = filters.len(),
            "converted column filters"
        );

        filters
    }

    fn convert_array(
        &self,
        column_ref: ColumnRef,
        nullable: bool,
        name: &str,
        element_type: &ArrayElementType,
    ) -> Vec<Filter> {
        let mut filters = vec![
            Filter::ArrayOverlap(ArrayOverlapFilter::new(
                column_ref.clone(),
                name,
                element_type.clone(),
            )),
            Filter::ArrayNotContains(ArrayNotContainsFilter::new(
                column_ref.clone(),
                name,
                element_type.clone(),
            )),
            Filter::ArrayEqual(ArrayEqualFilter::new(
                column_ref.clone(),
                name,
                element_type.clone(),
            )),
        ];
        if nullable {
            filters.push(Filter::ArrayEmpty(ArrayEmptyFilter::new(column_ref, name)));
        }
        filters
    }
}

/// The indexed filters exposed by one list view.
///
/// A filter's index is its position in this set and doubles as its
/// argument key in `flt{position}_{index}` query parameters.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    filters: Vec<Filter>,
}

impl FilterSet {
    /// Build the filter set for a model's filterable columns.
    ///
    /// Unknown column names are skipped with a warning.
    pub fn for_model(model: &ModelDef, converter: &FilterConverter) -> Self {
        let mut filters = Vec::new();
        for name in &model.filterable {
            let Some(column) = model.get_column(name) else {
                tracing::warn!(table = %model.table, column = %name, "filterable column not found");
                continue;
            };
            filters.extend(converter.convert(&model.table, column, &column.label()));
        }
        Self { filters }
    }

    pub fn from_filters(filters: Vec<Filter>) -> Self {
        Self { filters }
    }

    pub fn get(&self, index: usize) -> Option<&Filter> {
        self.filters.get(index)
    }

    /// Resolve a query-string argument key.
    pub fn lookup(&self, key: &str) -> Option<(usize, &Filter)> {
        let index: usize = key.parse().ok()?;
        self.filters.get(index).map(|f| (index, f))
    }

    /// Argument key of the filter at `index`.
    pub fn arg_key(index: usize) -> String {
        index.to_string()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter()
    }

    /// Filters grouped by column label, for the filter picker UI.
    pub fn groups(&self) -> Vec<FilterGroup> {
        let mut groups: Vec<FilterGroup> = Vec::new();
        for (index, filter) in self.filters.iter().enumerate() {
            let choice = FilterChoice {
                arg: Self::arg_key(index),
                operation: filter.operation(),
                options: filter.options(),
            };
            match groups.iter_mut().find(|g| g.label == filter.name()) {
                Some(group) => group.filters.push(choice),
                None => groups.push(FilterGroup {
                    label: filter.name().to_string(),
                    filters: vec![choice],
                }),
            }
        }
        groups
    }
}

/// All filters on one column.
#[derive(Debug, Clone, Serialize)]
pub struct FilterGroup {
    pub label: String,
    pub filters: Vec<FilterChoice>,
}

/// One selectable filter operation.
#[derive(Debug, Clone, Serialize)]
pub struct FilterChoice {
    pub arg: String,
    pub operation: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<(String, String)>>,
}
