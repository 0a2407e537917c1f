//! Form field and widget argument types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// GOV.UK component used to render a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Widget {
    TextInput,
    Checkbox,
    /// Day/month/year inputs.
    DateInput,
    /// Day/month/year/hour/minute/second inputs.
    DateTimeInput,
    Select,
    /// Select progressively enhanced with search.
    SelectWithSearch { multiple: bool },
    /// Textarea holding one list item per line.
    ArrayTextArea,
}

impl Widget {
    /// Whether the widget renders inside a fieldset with a legend.
    pub fn uses_fieldset(&self) -> bool {
        matches!(self, Widget::DateInput | Widget::DateTimeInput)
    }

    /// Template rendering this widget.
    pub fn template(&self) -> &'static str {
        match self {
            Widget::TextInput => "govuk/text-input.html",
            Widget::Checkbox => "govuk/checkbox.html",
            Widget::DateInput => "govuk/date-input.html",
            Widget::DateTimeInput => "govuk/datetime-input.html",
            Widget::Select => "govuk/select.html",
            Widget::SelectWithSearch { .. } => "govuk/select-with-search.html",
            Widget::ArrayTextArea => "govuk/textarea.html",
        }
    }
}

/// Arguments used to construct one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldArgs {
    #[serde(flatten)]
    pub widget: Widget,

    /// `strftime` format the submitted parts are parsed with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// `(value, label)` pairs for selects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<(String, String)>,

    /// Whether a missing value passes choice validation.
    #[serde(default)]
    pub allow_blank: bool,

    #[serde(default)]
    pub required: bool,
}

impl FieldArgs {
    pub fn new(widget: Widget) -> Self {
        Self {
            widget,
            format: None,
            choices: Vec::new(),
            allow_blank: false,
            required: false,
        }
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn choices(mut self, choices: Vec<(String, String)>) -> Self {
        self.choices = choices;
        self
    }

    pub fn allow_blank(mut self, allow_blank: bool) -> Self {
        self.allow_blank = allow_blank;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Values accepted by choice validation, excluding the blank choice.
    pub fn accepted_values(&self) -> impl Iterator<Item = &str> {
        self.choices
            .iter()
            .map(|(value, _)| value.as_str())
            .filter(|value| !value.is_empty())
    }
}

/// Validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field name (None for form-level errors).
    pub field: Option<String>,

    /// Error message.
    pub message: String,
}

impl ValidationError {
    /// Create a field-level error.
    pub fn field(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(name.into()),
            message: message.into(),
        }
    }

    /// Create a form-level error.
    pub fn form(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

/// Template params passed to a widget, e.g. `{"label": {"classes": ..}}`.
pub type WidgetArgs = Map<String, Value>;

/// Set `path` to `value` unless something is already there.
///
/// Intermediate objects are created as needed; a non-object in the way is
/// left alone.
pub fn set_default(args: &mut WidgetArgs, path: &[&str], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut current = args;
    for key in parents {
        let entry = current
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(next) = entry else {
            return;
        };
        current = next;
    }
    current.entry(last.to_string()).or_insert(value);
}

/// Recursively merge `overlay` into `base`; overlay values win.
pub fn merge(base: &mut WidgetArgs, overlay: &WidgetArgs) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => merge(existing, incoming),
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}
