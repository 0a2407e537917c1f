//! Column metadata for admin-managed models.
//!
//! Widgets and filters are chosen from a closed set of column kinds rather
//! than by inspecting the storage type at runtime, so every mapping is an
//! exhaustive `match`.

use serde::{Deserialize, Serialize};

/// Storage kind of a single column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnKind {
    /// Short string (`varchar`).
    String,
    /// Unbounded text.
    Text,
    /// Any integer width.
    Integer,
    /// Floating point or numeric.
    Float,
    /// Boolean flag.
    Boolean,
    /// Calendar date.
    Date,
    /// Timestamp without time zone.
    DateTime,
    /// Time of day.
    Time,
    /// UUID key.
    Uuid,
    /// Enumerated tag.
    Enum(EnumType),
    /// Ordered sequence of a fixed element type.
    Array(ArrayElementType),
}

impl ColumnKind {
    /// Short name used in log fields and template context.
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnKind::String => "string",
            ColumnKind::Text => "text",
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Date => "date",
            ColumnKind::DateTime => "datetime",
            ColumnKind::Time => "time",
            ColumnKind::Uuid => "uuid",
            ColumnKind::Enum(_) => "enum",
            ColumnKind::Array(_) => "array",
        }
    }
}

/// A database enum type and its members, in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnumType {
    /// SQL type name used for casts (e.g. `tag`).
    pub sql_name: String,

    /// Members in declaration order.
    pub members: Vec<EnumMember>,
}

impl EnumType {
    /// Create an enum type from `(name, value)` pairs.
    pub fn new<N, V>(sql_name: impl Into<String>, members: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        Self {
            sql_name: sql_name.into(),
            members: members
                .into_iter()
                .map(|(name, value)| EnumMember {
                    name: name.into(),
                    value: value.into(),
                })
                .collect(),
        }
    }

    /// Look up a member by its exact name.
    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// `(name, value)` pairs for select and filter choices.
    pub fn choices(&self) -> Vec<(String, String)> {
        self.members
            .iter()
            .map(|m| (m.name.clone(), m.value.clone()))
            .collect()
    }
}

/// One member of an enum type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EnumMember {
    /// Stored name (e.g. `RED`).
    pub name: String,

    /// Display value (e.g. `red`).
    pub value: String,
}

/// Element type shared by every entry of an array column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "element", rename_all = "snake_case")]
pub enum ArrayElementType {
    /// Enumerated tags.
    Enum(EnumType),
    /// Free text.
    Text,
}

impl ArrayElementType {
    /// SQL element type used in `ARRAY[..]::T[]` casts.
    pub fn sql_type(&self) -> &str {
        match self {
            ArrayElementType::Enum(enum_type) => &enum_type.sql_name,
            ArrayElementType::Text => "text",
        }
    }

    /// Choices for filter and widget UI; `None` for free text.
    pub fn options(&self) -> Option<Vec<(String, String)>> {
        match self {
            ArrayElementType::Enum(enum_type) => Some(enum_type.choices()),
            ArrayElementType::Text => None,
        }
    }
}

/// A column of a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,

    /// Storage kind.
    #[serde(flatten)]
    pub kind: ColumnKind,

    /// Whether NULL is allowed.
    #[serde(default)]
    pub nullable: bool,
}

impl ColumnDef {
    /// Create a non-nullable column.
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
        }
    }

    /// Mark the column as nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Human-readable label derived from the column name (`last_logged_in_at`
    /// becomes `Last Logged In At`).
    pub fn label(&self) -> String {
        prettify_name(&self.name)
    }
}

/// A relationship to another model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    /// Attribute name on this model.
    pub name: String,

    /// Target table.
    pub target: String,

    /// Whether the relationship holds a collection.
    #[serde(default)]
    pub uselist: bool,
}

impl Relationship {
    pub fn new(name: impl Into<String>, target: impl Into<String>, uselist: bool) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            uselist,
        }
    }
}

/// An admin-managed model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDef {
    /// Table name.
    pub table: String,

    /// Columns in declaration order.
    #[serde(default)]
    pub columns: Vec<ColumnDef>,

    /// Relationships to other models.
    #[serde(default)]
    pub relationships: Vec<Relationship>,

    /// Columns matched by free-text search.
    #[serde(default)]
    pub searchable: Vec<String>,

    /// Columns exposed as list filters, in display order.
    #[serde(default)]
    pub filterable: Vec<String>,
}

impl ModelDef {
    /// Create an empty model for a table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            relationships: Vec::new(),
            searchable: Vec::new(),
            filterable: Vec::new(),
        }
    }

    /// Add a column.
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Add a relationship.
    pub fn relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Set the searchable columns.
    pub fn searchable(mut self, columns: &[&str]) -> Self {
        self.searchable = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Set the filterable columns.
    pub fn filterable(mut self, columns: &[&str]) -> Self {
        self.filterable = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Find a column by name.
    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Turn `snake_case` into `Title Case` words.
pub fn prettify_name(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
