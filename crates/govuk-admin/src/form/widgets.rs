//! Template params for the GOV.UK widgets.
//!
//! Each builder starts from the params shared by every component (id, name,
//! label, error message), merges the field's widget arguments over them and
//! then fills in the component-specific parts.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value, json};

use super::types::{WidgetArgs, merge, set_default};

const ERROR_CLASS: &str = "govuk-input--error";

/// Stored value of a bound field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
    None,
    Text(String),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    List(Vec<String>),
}

/// A form field bound to its submission and stored value.
#[derive(Debug, Clone)]
pub struct BoundField {
    pub name: String,
    pub label: String,
    /// Description shown as a hint.
    pub description: Option<String>,
    pub errors: Vec<String>,
    /// Values submitted with the request, if any.
    pub raw_data: Option<Vec<String>>,
    pub data: FieldData,
}

impl BoundField {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            description: None,
            errors: Vec::new(),
            raw_data: None,
            data: FieldData::None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn data(mut self, data: FieldData) -> Self {
        self.data = data;
        self
    }

    pub fn raw_data(mut self, raw: Vec<String>) -> Self {
        self.raw_data = Some(raw);
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.errors.push(message.into());
        self
    }

    fn input_classes(&self, width: &str) -> String {
        if self.errors.is_empty() {
            width.to_string()
        } else {
            format!("{width} {ERROR_CLASS}")
        }
    }

    /// Value of the text-like widgets.
    fn text_value(&self) -> Option<String> {
        if let Some(raw) = &self.raw_data {
            return raw.first().cloned();
        }
        match &self.data {
            FieldData::None => None,
            FieldData::Text(text) => Some(text.clone()),
            FieldData::Bool(b) => Some(b.to_string()),
            FieldData::Date(date) => Some(date.to_string()),
            FieldData::DateTime(dt) => Some(dt.to_string()),
            FieldData::List(items) => Some(items.join("\n")),
        }
    }

    /// Values currently selected in a select.
    fn selected(&self) -> Vec<String> {
        if let Some(raw) = &self.raw_data {
            return raw.clone();
        }
        match &self.data {
            FieldData::Text(text) => vec![text.clone()],
            FieldData::List(items) => items.clone(),
            _ => Vec::new(),
        }
    }
}

/// Params shared by every component, with the widget arguments merged in.
///
/// Keys under `params` are merged at the top level.
fn base_params(field: &BoundField, widget_args: &WidgetArgs) -> WidgetArgs {
    let mut params = Map::new();
    params.insert("id".to_string(), json!(field.name));
    params.insert("name".to_string(), json!(field.name));
    params.insert("label".to_string(), json!({"text": field.label}));
    params.insert("hint".to_string(), json!({"text": field.description}));
    if !field.errors.is_empty() {
        params.insert(
            "errorMessage".to_string(),
            json!({"text": field.errors.join(" ")}),
        );
    }

    let mut overlay = widget_args.clone();
    let nested = overlay.remove("params");
    merge(&mut params, &overlay);
    if let Some(Value::Object(nested)) = nested {
        merge(&mut params, &nested);
    }
    params
}

/// Strip a `hint` whose text is null so it does not render.
fn drop_empty_hint(params: &mut WidgetArgs) {
    let empty = matches!(
        params.get("hint"),
        Some(Value::Object(hint)) if hint.get("text").is_none_or(Value::is_null)
    );
    if empty {
        params.remove("hint");
    }
}

/// Give the fieldset legend the field label unless the caller set one.
fn default_legend(field: &BoundField, params: &mut WidgetArgs) {
    set_default(params, &["fieldset", "legend", "text"], json!(field.label));
}

fn part_item(
    field: &BoundField,
    label: &str,
    suffix: &str,
    width: &str,
    value: Option<String>,
) -> Value {
    json!({
        "label": label,
        "id": format!("{}-{suffix}", field.name),
        "name": field.name,
        "classes": field.input_classes(width),
        "value": value,
    })
}

/// Split the submission or stored value into `count` parts.
fn parts(field: &BoundField, count: usize) -> Vec<Option<String>> {
    if let Some(raw) = &field.raw_data {
        return (0..count).map(|i| raw.get(i).cloned()).collect();
    }
    let formatted = match &field.data {
        FieldData::Date(date) => Some(date.format("%d %m %Y").to_string()),
        FieldData::DateTime(dt) => Some(dt.format("%d %m %Y %H %M %S").to_string()),
        _ => None,
    };
    match formatted {
        Some(text) => text.split(' ').take(count).map(|p| Some(p.to_string())).collect(),
        None => vec![None; count],
    }
}

/// `govukInput` params.
pub fn text_input_params(field: &BoundField, widget_args: &WidgetArgs) -> WidgetArgs {
    let mut params = base_params(field, widget_args);
    params.insert("value".to_string(), json!(field.text_value()));
    drop_empty_hint(&mut params);
    params
}

/// `govukTextarea` params for a list edited one item per line.
pub fn array_textarea_params(field: &BoundField, widget_args: &WidgetArgs) -> WidgetArgs {
    let mut params = base_params(field, widget_args);
    let value = match (&field.raw_data, &field.data) {
        (Some(raw), _) => raw.first().cloned().unwrap_or_default(),
        (None, FieldData::List(items)) => super::fields::ArrayTextArea::display(items),
        _ => String::new(),
    };
    params.insert("value".to_string(), json!(value));
    drop_empty_hint(&mut params);
    params
}

/// `govukDateInput` params: day, month and year items.
pub fn date_input_params(field: &BoundField, widget_args: &WidgetArgs) -> WidgetArgs {
    let mut params = base_params(field, widget_args);
    default_legend(field, &mut params);
    drop_empty_hint(&mut params);

    let values = parts(field, 3);
    let specs = [
        ("Day", "day", "govuk-input--width-2"),
        ("Month", "month", "govuk-input--width-2"),
        ("Year", "year", "govuk-input--width-4"),
    ];
    let items: Vec<Value> = specs
        .iter()
        .zip(values)
        .map(|((label, suffix, width), value)| part_item(field, label, suffix, width, value))
        .collect();
    params.entry("items".to_string()).or_insert(Value::Array(items));
    params
}

/// Datetime params: six inputs from day to second under one legend.
pub fn datetime_input_params(field: &BoundField, widget_args: &WidgetArgs) -> WidgetArgs {
    let mut params = base_params(field, widget_args);
    default_legend(field, &mut params);
    drop_empty_hint(&mut params);

    let values = parts(field, 6);
    let specs = [
        ("Day", "day", "govuk-input--width-2"),
        ("Month", "month", "govuk-input--width-2"),
        ("Year", "year", "govuk-input--width-4"),
        ("Hour", "hour", "govuk-input--width-2"),
        ("Minute", "minute", "govuk-input--width-2"),
        ("Second", "second", "govuk-input--width-2"),
    ];
    let items: Vec<Value> = specs
        .iter()
        .zip(values)
        .map(|((label, suffix, width), value)| part_item(field, label, suffix, width, value))
        .collect();
    params.entry("items".to_string()).or_insert(Value::Array(items));
    params
}

/// `govukSelect` params; `choices` are `(value, text)` pairs.
pub fn select_params(
    field: &BoundField,
    widget_args: &WidgetArgs,
    choices: &[(String, String)],
) -> WidgetArgs {
    let mut params = base_params(field, widget_args);
    params.insert("items".to_string(), Value::Array(select_items(field, choices)));
    drop_empty_hint(&mut params);
    params
}

/// Select-with-search params, items under `select_items`.
pub fn select_with_search_params(
    field: &BoundField,
    widget_args: &WidgetArgs,
    choices: &[(String, String)],
    multiple: bool,
) -> WidgetArgs {
    let mut params = base_params(field, widget_args);
    params.insert(
        "select_items".to_string(),
        Value::Array(select_items(field, choices)),
    );
    params.insert("multiple".to_string(), json!(multiple));
    drop_empty_hint(&mut params);
    params
}

fn select_items(field: &BoundField, choices: &[(String, String)]) -> Vec<Value> {
    let selected = field.selected();
    choices
        .iter()
        .map(|(value, text)| {
            json!({
                "text": text,
                "value": value,
                "selected": selected.contains(value),
            })
        })
        .collect()
}

/// `govukCheckboxes` params for a single boolean checkbox.
pub fn checkbox_params(field: &BoundField, widget_args: &WidgetArgs) -> WidgetArgs {
    let mut params = base_params(field, widget_args);
    let checked = match (&field.raw_data, &field.data) {
        (Some(raw), _) => raw.iter().any(|v| v == "y" || v == "1" || v == "true"),
        (None, FieldData::Bool(b)) => *b,
        _ => false,
    };
    let label = params.remove("label").unwrap_or_else(|| json!({}));
    params.insert(
        "items".to_string(),
        json!([{
            "text": field.label,
            "value": "y",
            "checked": checked,
            "label": label,
        }]),
    );
    drop_empty_hint(&mut params);
    params
}
