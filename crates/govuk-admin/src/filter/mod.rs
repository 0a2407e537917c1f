//! List view filtering.
//!
//! This module provides:
//! - FilterConverter / FilterSet: the filters offered for each column kind
//! - Array predicates: "has any of", "not contains", "equals", "empty"
//! - Scalar predicates with typed validation
//! - ListArgs: query-string parsing and list URLs
//! - ListQueryBuilder: SeaQuery-based SQL generation

pub mod args;
pub mod array;
mod converter;
mod query_builder;
pub mod scalar;
pub mod types;

pub use args::{ActiveFilter, ListArgs, QueryArgs};
pub use array::{
    ArrayElement, ArrayEmptyFilter, ArrayEqualFilter, ArrayNotContainsFilter, ArrayOverlapFilter,
    normalize,
};
pub use converter::{FilterChoice, FilterConverter, FilterGroup, FilterSet};
pub use query_builder::ListQueryBuilder;
pub use scalar::{ScalarFilter, ScalarOp, ScalarType};
pub use types::{ColumnRef, Filter, FilterError, FilterPredicate, FilterValue, RawFilterValue};
