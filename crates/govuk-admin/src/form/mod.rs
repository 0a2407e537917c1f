//! GOV.UK form fields for admin edit views.
//!
//! The form layer supports:
//! - Column kind to widget conversion, with per-field overrides
//! - Widget argument defaults (bold labels and legends)
//! - Template params for date, datetime, select-with-search and checkbox
//! - Parsing of multi-part date inputs and newline-separated lists

mod converter;
mod fields;
mod types;
pub mod widgets;

pub use converter::{
    DATE_FORMAT, DATETIME_FORMAT, FormField, ModelFormConverter, validate_choice, validate_choices,
};
pub use fields::{ArrayTextArea, parse_date_parts, parse_datetime_parts};
pub use types::{FieldArgs, ValidationError, Widget, WidgetArgs, merge, set_default};
pub use widgets::{BoundField, FieldData};
