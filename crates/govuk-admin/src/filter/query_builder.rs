//! List view query builder using SeaQuery.
//!
//! Renders the SELECT and COUNT statements of a list page from the model,
//! its filter set and the parsed list arguments. Running them is left to
//! the host application.

use sea_query::{
    Alias, Asterisk, Cond, Expr, Order, PostgresQueryBuilder, Query, SelectStatement,
};

use crate::model::ModelDef;

use super::args::ListArgs;
use super::converter::FilterSet;
use super::scalar::escape_like_wildcards;
use super::types::{ColumnRef, FilterError};

/// Query builder for one list request.
pub struct ListQueryBuilder<'a> {
    model: &'a ModelDef,
    filters: &'a FilterSet,
    args: &'a ListArgs,
}

impl<'a> ListQueryBuilder<'a> {
    pub fn new(model: &'a ModelDef, filters: &'a FilterSet, args: &'a ListArgs) -> Self {
        Self {
            model,
            filters,
            args,
        }
    }

    /// Build the page SELECT, `page_size` rows from the requested page.
    pub fn build(&self, page_size: usize) -> Result<String, FilterError> {
        let mut query = Query::select();

        query.column((Alias::new(&self.model.table), Asterisk));
        query.from(Alias::new(&self.model.table));

        self.add_filters(&mut query)?;
        self.add_search(&mut query);
        self.add_sort(&mut query);

        let page = self.args.page;
        let page_size = self.args.page_size.unwrap_or(page_size);
        let offset = page
            .checked_mul(page_size)
            .and_then(|offset| u64::try_from(offset).ok())
            .ok_or(FilterError::PageOutOfRange { page, page_size })?;
        query.limit(page_size as u64);
        query.offset(offset);

        Ok(query.to_string(PostgresQueryBuilder))
    }

    /// Build a COUNT query over the same filters and search.
    pub fn build_count(&self) -> Result<String, FilterError> {
        let mut query = Query::select();

        query.expr(Expr::col(Asterisk).count());
        query.from(Alias::new(&self.model.table));

        self.add_filters(&mut query)?;
        self.add_search(&mut query);

        Ok(query.to_string(PostgresQueryBuilder))
    }

    /// AND every active filter's condition into the WHERE clause.
    fn add_filters(&self, query: &mut SelectStatement) -> Result<(), FilterError> {
        for active in &self.args.filters {
            let Some(filter) = self.filters.get(active.index) else {
                tracing::warn!(index = active.index, "active filter missing from filter set");
                continue;
            };
            query.and_where(filter.condition(&active.value)?);
        }
        Ok(())
    }

    /// Each search term must match at least one searchable column.
    fn add_search(&self, query: &mut SelectStatement) {
        let Some(search) = &self.args.search else {
            return;
        };
        if self.model.searchable.is_empty() {
            return;
        }

        for term in search.split_whitespace() {
            let pattern = format!("%{}%", escape_like_wildcards(term));
            let mut any = Cond::any();
            for column in &self.model.searchable {
                let column = ColumnRef::new(&self.model.table, column);
                any = any.add(Expr::cust_with_values(
                    format!("{} ILIKE $1", column.quoted()),
                    [pattern.clone()],
                ));
            }
            query.and_where(any.into());
        }
    }

    fn add_sort(&self, query: &mut SelectStatement) {
        let Some(column) = self.args.sort.and_then(|i| self.model.columns.get(i)) else {
            return;
        };
        let order = if self.args.desc {
            Order::Desc
        } else {
            Order::Asc
        };
        query.order_by(
            (Alias::new(&self.model.table), Alias::new(&column.name)),
            order,
        );
    }
}
