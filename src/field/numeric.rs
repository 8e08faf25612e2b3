//! Numeric field validation.
//!
//! This module provides [`IntegerField`] and [`FloatField`] for numeric
//! columns with minimum/maximum value constraints.

use std::ops::RangeInclusive;
use std::sync::Arc;

use serde_json::{json, Value as Json};

use crate::error::{Reason, Violation};
use crate::interop::ToJsonSchema;
use crate::table::{Column, Value};

use super::lookup::{check_exists, IdentifierLookup};
use super::traits::{coerce_cells, flagged, into_violations, FieldType};

/// A constraint applied to integer cells.
#[derive(Clone)]
enum IntegerConstraint {
    Min {
        value: i64,
        message: Option<String>,
    },
    Max {
        value: i64,
        message: Option<String>,
    },
    Exists {
        lookup: Arc<dyn IdentifierLookup>,
        message: Option<String>,
    },
}

/// A field for integer columns.
///
/// Text is parsed after trimming (`"234556"` becomes `234556`). Only an
/// optional minus sign followed by digits is accepted; any other text,
/// including `"2.5"` and `"1e3"`, is `NON_NUMERIC_VALUE`. Floats with no
/// fractional part are accepted; other floats, booleans and dates are
/// `INVALID_TYPE`.
///
/// # Example
///
/// ```rust
/// use tablecheck::{Column, Field, FieldType, Reason, Value};
///
/// let field = Field::integer().range(1..=100);
/// let (coerced, _) = field.coerce(&Column::new(vec![Value::from("50"), Value::from("150")]));
///
/// let violations = field.check_constraints(&coerced);
/// assert_eq!(violations[0].reason, Reason::MaxValue);
/// ```
#[derive(Clone)]
pub struct IntegerField {
    constraints: Vec<IntegerConstraint>,
    type_error_message: Option<String>,
}

impl IntegerField {
    /// Creates a new integer field with no constraints.
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
            type_error_message: None,
        }
    }

    /// Adds a minimum value constraint (inclusive).
    pub fn min(mut self, value: i64) -> Self {
        self.constraints.push(IntegerConstraint::Min {
            value,
            message: None,
        });
        self
    }

    /// Adds a maximum value constraint (inclusive).
    pub fn max(mut self, value: i64) -> Self {
        self.constraints.push(IntegerConstraint::Max {
            value,
            message: None,
        });
        self
    }

    /// Adds both minimum and maximum value constraints (inclusive range).
    ///
    /// This is a convenience method equivalent to calling `.min(start).max(end)`.
    pub fn range(self, range: RangeInclusive<i64>) -> Self {
        self.min(*range.start()).max(*range.end())
    }

    /// Requires every value to exist in an external lookup.
    pub fn exists_in(mut self, lookup: Arc<dyn IdentifierLookup>) -> Self {
        self.constraints.push(IntegerConstraint::Exists {
            lookup,
            message: None,
        });
        self
    }

    /// Sets a custom error message for the most recent constraint.
    ///
    /// If no constraints have been added yet, this sets the message used for
    /// coercion failures.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        if let Some(last) = self.constraints.last_mut() {
            match last {
                IntegerConstraint::Min { message: m, .. } => *m = Some(message.into()),
                IntegerConstraint::Max { message: m, .. } => *m = Some(message.into()),
                IntegerConstraint::Exists { message: m, .. } => *m = Some(message.into()),
            }
        } else {
            self.type_error_message = Some(message.into());
        }
        self
    }
}

impl Default for IntegerField {
    fn default() -> Self {
        Self::new()
    }
}

fn cast_integer(value: &Value) -> Result<Value, Reason> {
    match value {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Value::Int(*f as i64)),
        Value::Text(s) => {
            let trimmed = s.trim();
            let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Reason::NonNumericValue);
            }
            trimmed
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| Reason::NonNumericValue)
        }
        _ => Err(Reason::InvalidType),
    }
}

impl FieldType for IntegerField {
    fn type_name(&self) -> &'static str {
        "integer"
    }

    fn coerce(&self, column: &Column) -> (Column, Vec<Violation>) {
        let (coerced, failures) = coerce_cells(column, cast_integer);
        let violations = into_violations(failures, |v| {
            v.with_message_opt(self.type_error_message.as_ref())
        });
        (coerced, violations)
    }

    fn check_constraints(&self, column: &Column) -> Vec<Violation> {
        self.constraints
            .iter()
            .filter_map(|constraint| match constraint {
                IntegerConstraint::Min { value, message } => {
                    let rows = column.present_positions(|v| v.as_i64().is_some_and(|n| n < *value));
                    flagged(Reason::MinValue, rows).map(|v| {
                        v.with_param("limit_value", json!(value))
                            .with_message_opt(message.as_ref())
                    })
                }
                IntegerConstraint::Max { value, message } => {
                    let rows = column.present_positions(|v| v.as_i64().is_some_and(|n| n > *value));
                    flagged(Reason::MaxValue, rows).map(|v| {
                        v.with_param("limit_value", json!(value))
                            .with_message_opt(message.as_ref())
                    })
                }
                IntegerConstraint::Exists { lookup, message } => {
                    check_exists(lookup, column, message.as_ref())
                }
            })
            .collect()
    }
}

impl ToJsonSchema for IntegerField {
    fn to_json_schema(&self) -> Json {
        let mut schema = serde_json::Map::new();
        schema.insert("type".to_string(), json!("integer"));
        for constraint in &self.constraints {
            match constraint {
                IntegerConstraint::Min { value, .. } => {
                    schema.insert("minimum".to_string(), json!(value));
                }
                IntegerConstraint::Max { value, .. } => {
                    schema.insert("maximum".to_string(), json!(value));
                }
                IntegerConstraint::Exists { .. } => {}
            }
        }
        Json::Object(schema)
    }
}

/// A constraint applied to float cells.
#[derive(Clone)]
enum FloatConstraint {
    Min { value: f64, message: Option<String> },
    Max { value: f64, message: Option<String> },
}

/// A field for floating point columns.
///
/// Integers widen to floats and numeric text is parsed; text that is not a
/// finite number is reported as `NON_NUMERIC_VALUE`.
#[derive(Clone)]
pub struct FloatField {
    constraints: Vec<FloatConstraint>,
    type_error_message: Option<String>,
}

impl FloatField {
    /// Creates a new float field with no constraints.
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
            type_error_message: None,
        }
    }

    /// Adds a minimum value constraint (inclusive).
    pub fn min(mut self, value: f64) -> Self {
        self.constraints.push(FloatConstraint::Min {
            value,
            message: None,
        });
        self
    }

    /// Adds a maximum value constraint (inclusive).
    pub fn max(mut self, value: f64) -> Self {
        self.constraints.push(FloatConstraint::Max {
            value,
            message: None,
        });
        self
    }

    /// Sets a custom error message for the most recent constraint, or for
    /// coercion failures if there are no constraints yet.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        if let Some(last) = self.constraints.last_mut() {
            match last {
                FloatConstraint::Min { message: m, .. } => *m = Some(message.into()),
                FloatConstraint::Max { message: m, .. } => *m = Some(message.into()),
            }
        } else {
            self.type_error_message = Some(message.into());
        }
        self
    }
}

impl Default for FloatField {
    fn default() -> Self {
        Self::new()
    }
}

fn cast_float(value: &Value) -> Result<Value, Reason> {
    match value {
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Int(n) => Ok(Value::Float(*n as f64)),
        Value::Text(s) => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Value::Float(f)),
            _ => Err(Reason::NonNumericValue),
        },
        _ => Err(Reason::InvalidType),
    }
}

impl FieldType for FloatField {
    fn type_name(&self) -> &'static str {
        "float"
    }

    fn coerce(&self, column: &Column) -> (Column, Vec<Violation>) {
        let (coerced, failures) = coerce_cells(column, cast_float);
        let violations = into_violations(failures, |v| {
            v.with_message_opt(self.type_error_message.as_ref())
        });
        (coerced, violations)
    }

    fn check_constraints(&self, column: &Column) -> Vec<Violation> {
        self.constraints
            .iter()
            .filter_map(|constraint| {
                let (reason, limit, message) = match constraint {
                    FloatConstraint::Min { value, message } => (Reason::MinValue, *value, message),
                    FloatConstraint::Max { value, message } => (Reason::MaxValue, *value, message),
                };
                let rows = column.present_positions(|v| {
                    v.as_f64().is_some_and(|x| match reason {
                        Reason::MinValue => x < limit,
                        _ => x > limit,
                    })
                });
                flagged(reason, rows).map(|v| {
                    v.with_param("limit_value", json!(limit))
                        .with_message_opt(message.as_ref())
                })
            })
            .collect()
    }
}

impl ToJsonSchema for FloatField {
    fn to_json_schema(&self) -> Json {
        let mut schema = serde_json::Map::new();
        schema.insert("type".to_string(), json!("number"));
        for constraint in &self.constraints {
            match constraint {
                FloatConstraint::Min { value, .. } => {
                    schema.insert("minimum".to_string(), json!(value));
                }
                FloatConstraint::Max { value, .. } => {
                    schema.insert("maximum".to_string(), json!(value));
                }
            }
        }
        Json::Object(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(v: &Violation) -> Vec<usize> {
        v.indexes.iter().copied().collect()
    }

    #[test]
    fn test_integer_coercion() {
        let raw = Column::new(vec![
            Value::from("234556"),
            Value::from(" -7 "),
            Value::Float(3.0),
            Value::Int(5),
            Value::Null,
        ]);
        let (coerced, violations) = IntegerField::new().coerce(&raw);
        assert!(violations.is_empty());
        assert_eq!(
            coerced.values(),
            &[Value::Int(234556), Value::Int(-7), Value::Int(3), Value::Int(5), Value::Null]
        );
    }

    #[test]
    fn test_integer_coercion_failures_grouped_by_reason() {
        let raw = Column::new(vec![
            Value::from("abc"),
            Value::Float(1.5),
            Value::from("x1"),
            Value::Bool(true),
            Value::from("2.5"),
            Value::from("1e3"),
            Value::from("3.0"),
            Value::from("+4"),
        ]);
        let (coerced, violations) = IntegerField::new().coerce(&raw);

        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].reason, Reason::NonNumericValue);
        assert_eq!(rows(&violations[0]), vec![0, 2, 4, 5, 6, 7]);
        assert_eq!(violations[1].reason, Reason::InvalidType);
        assert_eq!(rows(&violations[1]), vec![1, 3]);
        assert!(coerced.iter().all(Value::is_null));
    }

    #[test]
    fn test_integer_range() {
        let field = IntegerField::new().range(0..=10);
        let column = Column::new(vec![Value::Int(-1), Value::Int(5), Value::Int(11), Value::Null]);
        let violations = field.check_constraints(&column);

        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].reason, Reason::MinValue);
        assert_eq!(violations[0].params.get("limit_value"), Some(&json!(0)));
        assert_eq!(rows(&violations[0]), vec![0]);
        assert_eq!(violations[1].reason, Reason::MaxValue);
        assert_eq!(rows(&violations[1]), vec![2]);
    }

    #[test]
    fn test_integer_custom_messages() {
        let field = IntegerField::new().error("not a number").min(1).error("too small");
        let (_, violations) = field.coerce(&Column::new(vec![Value::from("x")]));
        assert_eq!(violations[0].message, "not a number");

        let violations = field.check_constraints(&Column::new(vec![Value::Int(0)]));
        assert_eq!(violations[0].message, "too small");
    }

    #[test]
    fn test_float_coercion() {
        let raw = Column::new(vec![Value::Int(2), Value::from("1.25"), Value::from("nan"), Value::from("?")]);
        let (coerced, violations) = FloatField::new().coerce(&raw);
        assert_eq!(coerced.get(0), Some(&Value::Float(2.0)));
        assert_eq!(coerced.get(1), Some(&Value::Float(1.25)));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].reason, Reason::NonNumericValue);
        assert_eq!(rows(&violations[0]), vec![2, 3]);
    }

    #[test]
    fn test_float_bounds() {
        let field = FloatField::new().min(0.0).max(1.0);
        let column = Column::new(vec![Value::Float(-0.5), Value::Float(0.5), Value::Float(1.5)]);
        let violations = field.check_constraints(&column);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].params.get("limit_value"), Some(&json!(0.0)));
        assert_eq!(rows(&violations[1]), vec![2]);
    }

    #[test]
    fn test_json_schema() {
        assert_eq!(
            IntegerField::new().range(1..=5).to_json_schema(),
            json!({"type": "integer", "minimum": 1, "maximum": 5})
        );
    }
}
