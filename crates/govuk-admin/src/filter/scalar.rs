//! Scalar column filters with GOV.UK-style operation labels.
//!
//! Date, datetime and time comparisons read as "after"/"before" rather than
//! "greater than"/"smaller than". Datetime values entered without a
//! sub-second part are treated as covering that whole second.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use sea_query::{Cond, Expr, SimpleExpr};
use uuid::Uuid;

use crate::model::EnumType;

use super::types::{
    ColumnRef, FilterError, FilterPredicate, FilterValue, RawFilterValue, empty_options,
    parse_empty_flag,
};

/// Value type of the filtered column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarType {
    Text,
    Integer,
    Float,
    Boolean,
    Uuid,
    Date,
    DateTime,
    Time,
    Enum(EnumType),
}

impl ScalarType {
    fn is_temporal(&self) -> bool {
        matches!(self, ScalarType::Date | ScalarType::DateTime | ScalarType::Time)
    }
}

/// Comparison performed by a scalar filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarOp {
    Like,
    NotLike,
    Equal,
    NotEqual,
    Greater,
    Smaller,
    Empty,
}

/// A filter over a non-array column.
#[derive(Debug, Clone)]
pub struct ScalarFilter {
    column: ColumnRef,
    name: String,
    op: ScalarOp,
    value_type: ScalarType,
}

impl ScalarFilter {
    pub fn new(
        column: ColumnRef,
        name: impl Into<String>,
        op: ScalarOp,
        value_type: ScalarType,
    ) -> Self {
        Self {
            column,
            name: name.into(),
            op,
            value_type,
        }
    }

    pub fn op(&self) -> ScalarOp {
        self.op
    }

    pub fn value_type(&self) -> &ScalarType {
        &self.value_type
    }

    pub(crate) fn is_empty_filter(&self) -> bool {
        self.op == ScalarOp::Empty
    }

    fn parse_value(&self, raw: &str) -> Result<FilterValue, FilterError> {
        let value = raw.trim();
        let invalid = || FilterError::InvalidValue {
            value: raw.to_string(),
        };

        match &self.value_type {
            ScalarType::Text => Ok(FilterValue::Text(raw.to_string())),
            ScalarType::Integer => value.parse().map(FilterValue::Integer).map_err(|_| invalid()),
            ScalarType::Float => value.parse().map(FilterValue::Float).map_err(|_| invalid()),
            ScalarType::Boolean => match value {
                "1" => Ok(FilterValue::Boolean(true)),
                "0" => Ok(FilterValue::Boolean(false)),
                _ => Err(invalid()),
            },
            ScalarType::Uuid => Uuid::parse_str(value)
                .map(FilterValue::Uuid)
                .map_err(|_| invalid()),
            ScalarType::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(FilterValue::Date)
                .map_err(|_| invalid()),
            ScalarType::DateTime => parse_datetime(value)
                .filter(|dt| next_second(dt).is_some())
                .map(FilterValue::DateTime)
                .ok_or_else(invalid),
            ScalarType::Time => parse_time(value).map(FilterValue::Time).ok_or_else(invalid),
            ScalarType::Enum(enum_type) => enum_type
                .member(value)
                .cloned()
                .map(FilterValue::Member)
                .ok_or_else(|| FilterError::UnknownMember {
                    token: value.to_string(),
                    enum_name: enum_type.sql_name.clone(),
                }),
        }
    }

    fn mismatch(&self) -> FilterError {
        FilterError::ValueMismatch {
            operation: self.operation(),
        }
    }
}

/// `YYYY-MM-DD HH:MM:SS` with an optional fractional second.
fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").ok()
}

/// `HH:MM` or `HH:MM:SS`.
fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

/// The instant one second later, `None` at the end of the representable range.
fn next_second(value: &NaiveDateTime) -> Option<NaiveDateTime> {
    value.checked_add_signed(TimeDelta::seconds(1))
}

/// Whether a datetime was given to whole-second precision.
fn is_whole_second(value: &NaiveDateTime) -> bool {
    value.nanosecond() == 0
}

fn out_of_range(value: &NaiveDateTime) -> FilterError {
    FilterError::InvalidValue {
        value: value.to_string(),
    }
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
pub(crate) fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Bindable SQL value for a comparison.
fn sql_value(value: &FilterValue) -> Option<sea_query::Value> {
    Some(match value {
        FilterValue::Text(s) => s.clone().into(),
        FilterValue::Integer(i) => (*i).into(),
        FilterValue::Float(f) => (*f).into(),
        FilterValue::Boolean(b) => (*b).into(),
        FilterValue::Uuid(u) => (*u).into(),
        FilterValue::Date(d) => (*d).into(),
        FilterValue::DateTime(dt) => (*dt).into(),
        FilterValue::Time(t) => (*t).into(),
        FilterValue::Member(member) => member.name.clone().into(),
        FilterValue::Empty(_) | FilterValue::Elements(_) | FilterValue::Element(_) => {
            return None;
        }
    })
}

impl FilterPredicate for ScalarFilter {
    fn column(&self) -> &ColumnRef {
        &self.column
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn operation(&self) -> &'static str {
        match self.op {
            ScalarOp::Like => "contains",
            ScalarOp::NotLike => "not contains",
            ScalarOp::Equal => "equals",
            ScalarOp::NotEqual => "not equal",
            ScalarOp::Greater if self.value_type.is_temporal() => "after",
            ScalarOp::Greater => "greater than",
            ScalarOp::Smaller if self.value_type.is_temporal() => "before",
            ScalarOp::Smaller => "smaller than",
            ScalarOp::Empty => "empty",
        }
    }

    fn options(&self) -> Option<Vec<(String, String)>> {
        match (&self.op, &self.value_type) {
            (ScalarOp::Empty, _) => Some(empty_options()),
            (_, ScalarType::Boolean) => Some(vec![
                ("1".to_string(), "Yes".to_string()),
                ("0".to_string(), "No".to_string()),
            ]),
            (_, ScalarType::Enum(enum_type)) => Some(enum_type.choices()),
            _ => None,
        }
    }

    fn validate(&self, raw: &RawFilterValue) -> Result<FilterValue, FilterError> {
        if self.op == ScalarOp::Empty {
            return parse_empty_flag(raw);
        }
        let value = raw.single()?;
        if value.trim().is_empty() {
            return Err(FilterError::InvalidValue {
                value: value.to_string(),
            });
        }
        self.parse_value(value)
    }

    fn condition(&self, value: &FilterValue) -> Result<SimpleExpr, FilterError> {
        let column = &self.column;

        match self.op {
            ScalarOp::Empty => {
                let FilterValue::Empty(want_empty) = value else {
                    return Err(self.mismatch());
                };
                Ok(if *want_empty {
                    column.expr().is_null()
                } else {
                    column.expr().is_not_null()
                })
            }
            ScalarOp::Like | ScalarOp::NotLike => {
                let FilterValue::Text(text) = value else {
                    return Err(self.mismatch());
                };
                let operator = if self.op == ScalarOp::Like {
                    "ILIKE"
                } else {
                    "NOT ILIKE"
                };
                Ok(Expr::cust_with_values(
                    format!("{} {operator} $1", column.quoted()),
                    [format!("%{}%", escape_like_wildcards(text))],
                ))
            }
            ScalarOp::Equal => {
                if let FilterValue::DateTime(dt) = value
                    && is_whole_second(dt)
                {
                    let end_of_second = next_second(dt).ok_or_else(|| out_of_range(dt))?;
                    let cond = Cond::all()
                        .add(column.expr().gte(*dt))
                        .add(column.expr().lt(end_of_second));
                    return Ok(cond.into());
                }
                let value = sql_value(value).ok_or_else(|| self.mismatch())?;
                Ok(column.expr().eq(value))
            }
            ScalarOp::NotEqual => {
                let value = sql_value(value).ok_or_else(|| self.mismatch())?;
                Ok(column.expr().ne(value))
            }
            ScalarOp::Greater => {
                if let FilterValue::DateTime(dt) = value
                    && is_whole_second(dt)
                {
                    let next = next_second(dt).ok_or_else(|| out_of_range(dt))?;
                    return Ok(column.expr().gte(next));
                }
                let value = sql_value(value).ok_or_else(|| self.mismatch())?;
                Ok(column.expr().gt(value))
            }
            ScalarOp::Smaller => {
                let value = sql_value(value).ok_or_else(|| self.mismatch())?;
                Ok(column.expr().lt(value))
            }
        }
    }
}
