//! GOV.UK Design System theme layer for admin list and edit views.
//!
//! Pagination data, array-column filters, the column-to-filter and
//! column-to-field converters, form widget parameters and the Tera theme
//! with its asset route.

pub mod config;
pub mod error;
pub mod filter;
pub mod form;
pub mod model;
pub mod pagination;
pub mod routes;
pub mod theme;
