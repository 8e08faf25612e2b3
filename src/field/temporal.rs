//! Date and datetime field validation.
//!
//! This module provides [`DateField`] and [`DateTimeField`], which parse text
//! with a strftime format and report unparseable cells with the format they
//! expected.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{json, Value as Json};

use crate::error::{Reason, Violation};
use crate::interop::json_schema::strftime_to_json_schema_format;
use crate::interop::ToJsonSchema;
use crate::table::{Column, Value};

use super::traits::{coerce_cells, flagged, into_violations, FieldType};

/// Default format for [`DateField`].
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Default format for [`DateTimeField`].
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A constraint applied to date cells.
#[derive(Clone)]
enum DateConstraint {
    Min {
        value: NaiveDate,
        message: Option<String>,
    },
    Max {
        value: NaiveDate,
        message: Option<String>,
    },
}

/// A field for date columns.
///
/// Text is parsed with the field's format; failures are reported as
/// `INCORRECT_DATE_FORMAT` with a `format` parameter. Date cells pass through,
/// and other types are `INVALID_TYPE`.
///
/// # Example
///
/// ```rust
/// use tablecheck::{Column, Field, FieldType, Reason, Value};
///
/// let field = Field::date().format("%d/%m/%Y");
/// let (_, violations) = field.coerce(&Column::new(vec![
///     Value::from("31/12/2023"),
///     Value::from("2023-12-31"),
/// ]));
///
/// assert_eq!(violations[0].reason, Reason::IncorrectDateFormat);
/// assert_eq!(violations[0].params["format"], "%d/%m/%Y");
/// ```
#[derive(Clone)]
pub struct DateField {
    format: String,
    constraints: Vec<DateConstraint>,
    type_error_message: Option<String>,
}

impl DateField {
    /// Creates a new date field using `%Y-%m-%d`.
    pub fn new() -> Self {
        Self {
            format: DEFAULT_DATE_FORMAT.to_string(),
            constraints: Vec::new(),
            type_error_message: None,
        }
    }

    /// Sets the strftime format used to parse text.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Adds an earliest-date constraint (inclusive).
    pub fn min(mut self, value: NaiveDate) -> Self {
        self.constraints.push(DateConstraint::Min {
            value,
            message: None,
        });
        self
    }

    /// Adds a latest-date constraint (inclusive).
    pub fn max(mut self, value: NaiveDate) -> Self {
        self.constraints.push(DateConstraint::Max {
            value,
            message: None,
        });
        self
    }

    /// Sets a custom error message for the most recent constraint, or for
    /// parse failures if there are no constraints yet.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        if let Some(last) = self.constraints.last_mut() {
            match last {
                DateConstraint::Min { message: m, .. } => *m = Some(message.into()),
                DateConstraint::Max { message: m, .. } => *m = Some(message.into()),
            }
        } else {
            self.type_error_message = Some(message.into());
        }
        self
    }

    fn cast(&self, value: &Value) -> Result<Value, Reason> {
        match value {
            Value::Date(d) => Ok(Value::Date(*d)),
            Value::Text(s) => NaiveDate::parse_from_str(s.trim(), &self.format)
                .map(Value::Date)
                .map_err(|_| Reason::IncorrectDateFormat),
            _ => Err(Reason::InvalidType),
        }
    }
}

impl Default for DateField {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldType for DateField {
    fn type_name(&self) -> &'static str {
        "date"
    }

    fn coerce(&self, column: &Column) -> (Column, Vec<Violation>) {
        let (coerced, failures) = coerce_cells(column, |v| self.cast(v));
        let violations = into_violations(failures, |v| {
            let v = if v.reason == Reason::IncorrectDateFormat {
                v.with_param("format", json!(self.format))
            } else {
                v
            };
            v.with_message_opt(self.type_error_message.as_ref())
        });
        (coerced, violations)
    }

    fn check_constraints(&self, column: &Column) -> Vec<Violation> {
        self.constraints
            .iter()
            .filter_map(|constraint| {
                let (reason, limit, message) = match constraint {
                    DateConstraint::Min { value, message } => (Reason::MinValue, *value, message),
                    DateConstraint::Max { value, message } => (Reason::MaxValue, *value, message),
                };
                let rows = column.present_positions(|v| {
                    v.as_date().is_some_and(|d| match reason {
                        Reason::MinValue => d < limit,
                        _ => d > limit,
                    })
                });
                flagged(reason, rows).map(|v| {
                    v.with_param("limit_value", Value::Date(limit).to_json())
                        .with_message_opt(message.as_ref())
                })
            })
            .collect()
    }
}

impl ToJsonSchema for DateField {
    fn to_json_schema(&self) -> Json {
        match strftime_to_json_schema_format(&self.format) {
            Some(format) => json!({"type": "string", "format": format}),
            None => json!({"type": "string"}),
        }
    }
}

/// A field for datetime columns.
///
/// Text is parsed with the field's format; failures are reported as
/// `INCORRECT_DATETIME_FORMAT`. Dates widen to midnight.
#[derive(Clone)]
pub struct DateTimeField {
    format: String,
    type_error_message: Option<String>,
}

impl DateTimeField {
    /// Creates a new datetime field using `%Y-%m-%dT%H:%M:%S`.
    pub fn new() -> Self {
        Self {
            format: DEFAULT_DATETIME_FORMAT.to_string(),
            type_error_message: None,
        }
    }

    /// Sets the strftime format used to parse text.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Sets a custom message for parse failures.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }

    fn cast(&self, value: &Value) -> Result<Value, Reason> {
        match value {
            Value::DateTime(dt) => Ok(Value::DateTime(*dt)),
            Value::Date(d) => Ok(Value::DateTime(d.and_time(chrono::NaiveTime::default()))),
            Value::Text(s) => NaiveDateTime::parse_from_str(s.trim(), &self.format)
                .map(Value::DateTime)
                .map_err(|_| Reason::IncorrectDateTimeFormat),
            _ => Err(Reason::InvalidType),
        }
    }
}

impl Default for DateTimeField {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldType for DateTimeField {
    fn type_name(&self) -> &'static str {
        "datetime"
    }

    fn coerce(&self, column: &Column) -> (Column, Vec<Violation>) {
        let (coerced, failures) = coerce_cells(column, |v| self.cast(v));
        let violations = into_violations(failures, |v| {
            let v = if v.reason == Reason::IncorrectDateTimeFormat {
                v.with_param("format", json!(self.format))
            } else {
                v
            };
            v.with_message_opt(self.type_error_message.as_ref())
        });
        (coerced, violations)
    }

    fn check_constraints(&self, _column: &Column) -> Vec<Violation> {
        Vec::new()
    }
}

impl ToJsonSchema for DateTimeField {
    fn to_json_schema(&self) -> Json {
        match strftime_to_json_schema_format(&self.format) {
            Some(format) => json!({"type": "string", "format": format}),
            None => json!({"type": "string"}),
        }
    }
}
