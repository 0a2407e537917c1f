//! Column kind to GOV.UK form field conversion.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::model::{ArrayElementType, ColumnDef, ColumnKind, ModelDef, Relationship, prettify_name};

use super::types::{FieldArgs, ValidationError, Widget, WidgetArgs, merge, set_default};

/// `strftime` format of the three date parts.
pub const DATE_FORMAT: &str = "%d %m %Y";

/// `strftime` format of the six datetime parts.
pub const DATETIME_FORMAT: &str = "%d %m %Y %H %M %S";

const LABEL_CLASSES: &str = "govuk-label--s";
const LEGEND_CLASSES: &str = "govuk-fieldset__legend--s";

/// One field of a scaffolded form.
#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub args: FieldArgs,
    pub widget_args: WidgetArgs,
}

/// Maps model columns and relationships to form fields.
///
/// Field argument overrides replace the derived arguments; widget argument
/// overrides are merged over the defaults.
#[derive(Debug, Clone, Default)]
pub struct ModelFormConverter {
    field_overrides: HashMap<String, FieldArgs>,
    widget_overrides: HashMap<String, WidgetArgs>,
}

impl ModelFormConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the field arguments of `field`.
    pub fn with_field_args(mut self, field: impl Into<String>, args: FieldArgs) -> Self {
        self.field_overrides.insert(field.into(), args);
        self
    }

    /// Widget arguments of `field`, deep-merged over the derived defaults.
    ///
    /// Nested objects merge key by key and the given values win, so
    /// `{"classes": ".."}` keeps the default `label.classes`. Unlike
    /// [`with_field_args`](Self::with_field_args), this does not replace
    /// the whole set.
    pub fn with_widget_args(mut self, field: impl Into<String>, args: WidgetArgs) -> Self {
        self.widget_overrides.insert(field.into(), args);
        self
    }

    /// Field arguments derived from a column.
    pub fn field_args(&self, column: &ColumnDef) -> FieldArgs {
        let args = match &column.kind {
            ColumnKind::String
            | ColumnKind::Text
            | ColumnKind::Integer
            | ColumnKind::Float
            | ColumnKind::Uuid
            | ColumnKind::Time => FieldArgs::new(Widget::TextInput),
            ColumnKind::Boolean => FieldArgs::new(Widget::Checkbox),
            ColumnKind::Date => FieldArgs::new(Widget::DateInput).format(DATE_FORMAT),
            ColumnKind::DateTime => FieldArgs::new(Widget::DateTimeInput).format(DATETIME_FORMAT),
            ColumnKind::Enum(enum_type) => {
                let mut choices = enum_type.choices();
                if column.nullable {
                    choices.insert(0, (String::new(), String::new()));
                }
                FieldArgs::new(Widget::Select)
                    .choices(choices)
                    .allow_blank(column.nullable)
            }
            ColumnKind::Array(ArrayElementType::Enum(enum_type)) => {
                FieldArgs::new(Widget::SelectWithSearch { multiple: true })
                    .choices(enum_type.choices())
                    .allow_blank(true)
            }
            ColumnKind::Array(ArrayElementType::Text) => FieldArgs::new(Widget::ArrayTextArea),
        };
        args.required(!column.nullable && !matches!(column.kind, ColumnKind::Boolean))
    }

    /// Field arguments for a relationship.
    pub fn relation_args(&self, relationship: &Relationship) -> FieldArgs {
        FieldArgs::new(Widget::SelectWithSearch {
            multiple: relationship.uselist,
        })
        .allow_blank(true)
    }

    /// Default widget arguments for a column.
    pub fn widget_args(&self, column: &ColumnDef) -> WidgetArgs {
        let mut args = WidgetArgs::new();
        if matches!(column.kind, ColumnKind::Integer) {
            args.insert("params".to_string(), json!({"inputmode": "numeric"}));
        }
        if matches!(column.kind, ColumnKind::Date | ColumnKind::DateTime) {
            set_default(&mut args, &["fieldset", "legend", "classes"], json!(LEGEND_CLASSES));
        } else {
            set_default(&mut args, &["label", "classes"], json!(LABEL_CLASSES));
        }
        args
    }

    /// Default widget arguments for a relationship.
    pub fn relation_widget_args(&self, _relationship: &Relationship) -> WidgetArgs {
        let mut args = WidgetArgs::new();
        set_default(&mut args, &["label", "classes"], json!(LABEL_CLASSES));
        args
    }

    /// Every field of a model's edit form, columns first.
    pub fn scaffold_form(&self, model: &ModelDef) -> Vec<FormField> {
        let columns = model.columns.iter().map(|column| FormField {
            name: column.name.clone(),
            label: column.label(),
            args: self.field_args(column),
            widget_args: self.widget_args(column),
        });
        let relations = model.relationships.iter().map(|rel| FormField {
            name: rel.name.clone(),
            label: prettify_name(&rel.name),
            args: self.relation_args(rel),
            widget_args: self.relation_widget_args(rel),
        });

        let fields: Vec<FormField> = columns
            .chain(relations)
            .map(|mut field| {
                if let Some(args) = self.field_overrides.get(&field.name) {
                    field.args = args.clone();
                }
                if let Some(args) = self.widget_overrides.get(&field.name) {
                    merge(&mut field.widget_args, args);
                }
                field
            })
            .collect();

        debug!(table = %model.table, fields = fields.len(), "scaffolded form");
        fields
    }
}

/// Check a submitted select value against the field's choices.
///
/// Returns the accepted value, `None` for a blank submission on a field
/// that allows it.
pub fn validate_choice(
    name: &str,
    args: &FieldArgs,
    submitted: Option<&str>,
) -> Result<Option<String>, ValidationError> {
    match submitted.map(str::trim).filter(|v| !v.is_empty()) {
        None if args.allow_blank => Ok(None),
        None => Err(ValidationError::field(name, "This field is required.")),
        Some(value) if args.accepted_values().any(|v| v == value) => Ok(Some(value.to_string())),
        Some(value) => Err(ValidationError::field(
            name,
            format!("Invalid value, must be one of: {}.", accepted_list(args)),
        )),
    }
}

/// Check every submitted value of a multiple select.
pub fn validate_choices(
    name: &str,
    args: &FieldArgs,
    submitted: &[String],
) -> Result<Vec<String>, ValidationError> {
    let values: Vec<&str> = submitted
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();
    if values.is_empty() && !args.allow_blank {
        return Err(ValidationError::field(name, "This field is required."));
    }
    values
        .into_iter()
        .map(|value| {
            validate_choice(name, args, Some(value))?
                .ok_or_else(|| ValidationError::field(name, "This field is required."))
        })
        .collect()
}

fn accepted_list(args: &FieldArgs) -> String {
    args.accepted_values().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::EnumType;
    use serde_json::Value;

    fn colour() -> EnumType {
        EnumType::new("colour", [("RED", "red"), ("BLUE", "blue")])
    }

    #[test]
    fn integer_gets_numeric_inputmode() {
        let converter = ModelFormConverter::new();
        let column = ColumnDef::new("age", ColumnKind::Integer);
        assert_eq!(converter.field_args(&column).widget, Widget::TextInput);
        let args = converter.widget_args(&column);
        assert_eq!(args["params"]["inputmode"], "numeric");
        assert_eq!(args["label"]["classes"], LABEL_CLASSES);
    }

    #[test]
    fn dates_use_fieldset_legend() {
        let converter = ModelFormConverter::new();
        let column = ColumnDef::new("created_at", ColumnKind::DateTime);
        let field = converter.field_args(&column);
        assert_eq!(field.widget, Widget::DateTimeInput);
        assert_eq!(field.format.as_deref(), Some(DATETIME_FORMAT));

        let args = converter.widget_args(&column);
        assert_eq!(args["fieldset"]["legend"]["classes"], LEGEND_CLASSES);
        assert!(args.get("label").is_none());
    }

    #[test]
    fn nullable_enum_gets_blank_choice_first() {
        let converter = ModelFormConverter::new();
        let column = ColumnDef::new("favourite_colour", ColumnKind::Enum(colour())).nullable();
        let field = converter.field_args(&column);
        assert_eq!(field.widget, Widget::Select);
        assert_eq!(field.choices[0], (String::new(), String::new()));
        assert_eq!(field.choices[1], ("RED".to_string(), "red".to_string()));
        assert!(field.allow_blank);
        assert!(!field.required);
    }

    #[test]
    fn required_enum_has_no_blank_choice() {
        let converter = ModelFormConverter::new();
        let column = ColumnDef::new("favourite_colour", ColumnKind::Enum(colour()));
        let field = converter.field_args(&column);
        assert_eq!(field.choices.len(), 2);
        assert!(!field.allow_blank);
        assert!(field.required);
    }

    #[test]
    fn array_columns() {
        let converter = ModelFormConverter::new();
        let tags = ColumnDef::new("tags", ColumnKind::Array(ArrayElementType::Enum(colour())));
        assert_eq!(
            converter.field_args(&tags).widget,
            Widget::SelectWithSearch { multiple: true }
        );
        let notes = ColumnDef::new("notes", ColumnKind::Array(ArrayElementType::Text));
        assert_eq!(converter.field_args(&notes).widget, Widget::ArrayTextArea);
    }

    #[test]
    fn relationships_follow_uselist() {
        let converter = ModelFormConverter::new();
        let many = Relationship::new("posts", "post", true);
        let one = Relationship::new("owner", "user", false);
        assert_eq!(
            converter.relation_args(&many).widget,
            Widget::SelectWithSearch { multiple: true }
        );
        assert_eq!(
            converter.relation_args(&one).widget,
            Widget::SelectWithSearch { multiple: false }
        );
    }

    #[test]
    fn overrides_win_over_defaults() {
        let model = ModelDef::new("user")
            .column(ColumnDef::new("name", ColumnKind::String))
            .column(ColumnDef::new("age", ColumnKind::Integer));
        let mut custom = WidgetArgs::new();
        custom.insert("label".to_string(), serde_json::json!({"classes": "govuk-label--l"}));

        let fields = ModelFormConverter::new()
            .with_widget_args("name", custom)
            .scaffold_form(&model);

        assert_eq!(fields[0].widget_args["label"]["classes"], "govuk-label--l");
        assert_eq!(fields[1].widget_args["label"]["classes"], LABEL_CLASSES);
    }

    #[test]
    fn choice_validation() {
        let converter = ModelFormConverter::new();
        let nullable = converter
            .field_args(&ColumnDef::new("favourite_colour", ColumnKind::Enum(colour())).nullable());
        assert_eq!(validate_choice("c", &nullable, Some("RED")), Ok(Some("RED".to_string())));
        assert_eq!(validate_choice("c", &nullable, Some("")), Ok(None));
        assert_eq!(validate_choice("c", &nullable, None), Ok(None));

        let err = validate_choice("c", &nullable, Some("GREEN")).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("c"));
        assert!(err.message.contains("RED, BLUE"));

        let required = converter.field_args(&ColumnDef::new("c", ColumnKind::Enum(colour())));
        assert!(validate_choice("c", &required, None).is_err());
    }

    #[test]
    fn multiple_choice_validation() {
        let converter = ModelFormConverter::new();
        let tags = converter.field_args(&ColumnDef::new(
            "tags",
            ColumnKind::Array(ArrayElementType::Enum(colour())),
        ));
        assert_eq!(
            validate_choices("tags", &tags, &["RED".to_string(), "BLUE".to_string()]),
            Ok(vec!["RED".to_string(), "BLUE".to_string()])
        );
        assert_eq!(validate_choices("tags", &tags, &[]), Ok(vec![]));
        assert!(validate_choices("tags", &tags, &["PINK".to_string()]).is_err());
    }

    #[test]
    fn scaffolded_field_serializes() {
        let model = ModelDef::new("user").column(ColumnDef::new("active", ColumnKind::Boolean));
        let fields = ModelFormConverter::new().scaffold_form(&model);
        let json: Value = serde_json::to_value(&fields[0]).unwrap();
        assert_eq!(json["name"], "active");
        assert_eq!(json["args"]["widget"], "checkbox");
    }
}
