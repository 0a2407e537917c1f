//! View model of a list page.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::filter::{FilterGroup, FilterSet, ListArgs};
use crate::model::ModelDef;
use crate::pagination::{self, PaginationError, PaginationParams};

use super::format::format_cell;

/// An applied filter with its removal link.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveFilterView {
    pub label: String,
    pub operation: &'static str,
    pub value: String,
    pub remove_url: String,
}

/// Everything the list template renders.
#[derive(Debug, Clone, Serialize)]
pub struct ListPage {
    pub title: String,
    pub base_url: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub searchable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_search_url: Option<String>,
    pub active_filters: Vec<ActiveFilterView>,
    pub filter_groups: Vec<FilterGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationParams>,
}

/// Number of pages holding `count` rows, `page_size` at a time.
pub fn page_count(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

impl ListPage {
    /// Assemble the page for one list request.
    ///
    /// `rows` are keyed by column name. No pagination block is produced
    /// for an empty result; a page past the end is an error.
    pub fn build(
        model: &ModelDef,
        filters: &FilterSet,
        args: &ListArgs,
        rows: &[Map<String, Value>],
        total_count: usize,
        default_page_size: usize,
        base_url: &str,
    ) -> Result<Self, PaginationError> {
        let page_size = args.page_size.unwrap_or(default_page_size);
        let pages = page_count(total_count, page_size);

        let pagination = if pages == 0 {
            None
        } else {
            Some(pagination::build(args.page, pages, |page| {
                args.page_url(base_url, page, default_page_size)
            })?)
        };

        let rows = rows
            .iter()
            .map(|row| {
                model
                    .columns
                    .iter()
                    .map(|column| {
                        let value = row.get(&column.name).unwrap_or(&Value::Null);
                        format_cell(&column.kind, value)
                    })
                    .collect()
            })
            .collect();

        let active_filters = args
            .filters
            .iter()
            .enumerate()
            .map(|(position, active)| ActiveFilterView {
                label: active.label.clone(),
                operation: active.operation,
                value: active.raw.display(),
                remove_url: args.remove_filter_url(base_url, position, default_page_size),
            })
            .collect();

        Ok(Self {
            title: crate::model::prettify_name(&model.table),
            base_url: base_url.to_string(),
            columns: model.columns.iter().map(|c| c.label()).collect(),
            rows,
            searchable: !model.searchable.is_empty(),
            search: args.search.clone(),
            remove_search_url: args
                .search
                .as_ref()
                .map(|_| args.remove_search_url(base_url, default_page_size)),
            active_filters,
            filter_groups: filters.groups(),
            pagination,
        })
    }
}
