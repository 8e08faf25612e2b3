//! Text field validation.
//!
//! This module provides [`TextField`] for columns of strings with constraints
//! like minimum/maximum length, blank handling, regex patterns and choices.

use std::sync::Arc;

use regex::Regex;
use serde_json::{json, Value as Json};

use crate::error::{Reason, Violation};
use crate::interop::ToJsonSchema;
use crate::table::{Column, Value};

use super::lookup::{check_exists, IdentifierLookup};
use super::traits::{coerce_cells, flagged, into_violations, FieldType};

/// A constraint applied to text cells.
#[derive(Clone)]
enum TextConstraint {
    MinLength {
        min: usize,
        message: Option<String>,
    },
    MaxLength {
        max: usize,
        message: Option<String>,
    },
    Pattern {
        regex: Regex,
        pattern_str: String,
        message: Option<String>,
    },
    Choices {
        choices: Vec<String>,
        message: Option<String>,
    },
    Exists {
        lookup: Arc<dyn IdentifierLookup>,
        message: Option<String>,
    },
}

/// A field for text columns.
///
/// Integers and floats are accepted and rendered as text; booleans and dates
/// are rejected with `INVALID_TYPE`. Surrounding whitespace is trimmed unless
/// disabled, and empty strings are rejected with `BLANK_NOT_ALLOWED` unless
/// `allow_blank(true)` is set. Every constraint reports all of its violating
/// rows in one batch.
///
/// # Example
///
/// ```rust
/// use tablecheck::{Column, Field, FieldType, Reason, Value};
///
/// let field = Field::text().max_len(9);
/// let column = Column::new(vec![Value::from("Coca-Cola"), Value::from("0123456789")]);
///
/// let violations = field.check_constraints(&column);
/// assert_eq!(violations.len(), 1);
/// assert_eq!(violations[0].reason, Reason::MaxLengthValue);
/// assert!(violations[0].indexes.contains(&1));
/// ```
#[derive(Clone)]
pub struct TextField {
    constraints: Vec<TextConstraint>,
    allow_blank: bool,
    trim_whitespace: bool,
    type_error_message: Option<String>,
}

impl TextField {
    /// Creates a new text field with no constraints.
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
            allow_blank: false,
            trim_whitespace: true,
            type_error_message: None,
        }
    }

    /// Adds a minimum length constraint, counted in characters.
    pub fn min_len(mut self, min: usize) -> Self {
        self.constraints
            .push(TextConstraint::MinLength { min, message: None });
        self
    }

    /// Adds a maximum length constraint, counted in characters.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tablecheck::{Column, Field, FieldType, Value};
    ///
    /// let field = Field::text().max_len(3);
    /// let column = Column::new(vec![Value::from("日本語"), Value::from("abcd")]);
    ///
    /// let violations = field.check_constraints(&column);
    /// assert_eq!(violations[0].indexes.iter().copied().collect::<Vec<_>>(), vec![1]);
    /// ```
    pub fn max_len(mut self, max: usize) -> Self {
        self.constraints
            .push(TextConstraint::MaxLength { max, message: None });
        self
    }

    /// Adds a regex pattern constraint.
    ///
    /// Returns an error if the regex pattern is invalid.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        self.constraints.push(TextConstraint::Pattern {
            regex,
            pattern_str: pattern.to_string(),
            message: None,
        });
        Ok(self)
    }

    /// Restricts values to a fixed set of choices.
    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraints.push(TextConstraint::Choices {
            choices: choices.into_iter().map(Into::into).collect(),
            message: None,
        });
        self
    }

    /// Requires every value to exist in an external lookup.
    pub fn exists_in(mut self, lookup: Arc<dyn IdentifierLookup>) -> Self {
        self.constraints.push(TextConstraint::Exists {
            lookup,
            message: None,
        });
        self
    }

    /// Sets whether empty strings are accepted (default: false).
    pub fn allow_blank(mut self, allow: bool) -> Self {
        self.allow_blank = allow;
        self
    }

    /// Sets whether surrounding whitespace is trimmed (default: true).
    pub fn trim_whitespace(mut self, trim: bool) -> Self {
        self.trim_whitespace = trim;
        self
    }

    /// Sets a custom error message for the most recent constraint.
    ///
    /// If no constraints have been added yet, this sets the type error message
    /// (used when a cell cannot be read as text).
    pub fn error(mut self, message: impl Into<String>) -> Self {
        if let Some(last) = self.constraints.last_mut() {
            match last {
                TextConstraint::MinLength { message: m, .. } => *m = Some(message.into()),
                TextConstraint::MaxLength { message: m, .. } => *m = Some(message.into()),
                TextConstraint::Pattern { message: m, .. } => *m = Some(message.into()),
                TextConstraint::Choices { message: m, .. } => *m = Some(message.into()),
                TextConstraint::Exists { message: m, .. } => *m = Some(message.into()),
            }
        } else {
            self.type_error_message = Some(message.into());
        }
        self
    }

    fn cast(&self, value: &Value) -> Result<Value, Reason> {
        let text = match value {
            Value::Text(s) => s.clone(),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            _ => return Err(Reason::InvalidType),
        };
        if self.trim_whitespace {
            Ok(Value::Text(text.trim().to_string()))
        } else {
            Ok(Value::Text(text))
        }
    }

    /// Positions of non-null text cells that `predicate` flags.
    ///
    /// Blank cells are left to the blank check when blanks are not allowed.
    fn flag<F>(&self, column: &Column, predicate: F) -> std::collections::BTreeSet<usize>
    where
        F: Fn(&str) -> bool,
    {
        let skip_blank = !self.allow_blank;
        column.present_positions(|v| match v.as_str() {
            Some("") if skip_blank => false,
            Some(s) => predicate(s),
            None => false,
        })
    }
}

impl Default for TextField {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldType for TextField {
    fn type_name(&self) -> &'static str {
        "text"
    }

    fn coerce(&self, column: &Column) -> (Column, Vec<Violation>) {
        let (coerced, failures) = coerce_cells(column, |v| self.cast(v));
        let violations = into_violations(failures, |v| {
            v.with_message_opt(self.type_error_message.as_ref())
        });
        (coerced, violations)
    }

    fn check_constraints(&self, column: &Column) -> Vec<Violation> {
        let mut violations = Vec::new();

        if !self.allow_blank {
            let blank = column.present_positions(|v| v.as_str() == Some(""));
            violations.extend(flagged(Reason::BlankNotAllowed, blank));
        }

        for constraint in &self.constraints {
            let violation = match constraint {
                TextConstraint::MinLength { min, message } => {
                    let rows = self.flag(column, |s| s.chars().count() < *min);
                    flagged(Reason::MinLengthValue, rows).map(|v| {
                        v.with_param("limit_value", json!(min))
                            .with_message_opt(message.as_ref())
                    })
                }
                TextConstraint::MaxLength { max, message } => {
                    let rows = self.flag(column, |s| s.chars().count() > *max);
                    flagged(Reason::MaxLengthValue, rows).map(|v| {
                        v.with_param("limit_value", json!(max))
                            .with_message_opt(message.as_ref())
                    })
                }
                TextConstraint::Pattern {
                    regex,
                    pattern_str,
                    message,
                } => {
                    let rows = self.flag(column, |s| !regex.is_match(s));
                    flagged(Reason::PatternMismatch, rows).map(|v| {
                        v.with_param("pattern", json!(pattern_str))
                            .with_message_opt(message.as_ref())
                    })
                }
                TextConstraint::Choices { choices, message } => {
                    let rows = self.flag(column, |s| !choices.iter().any(|c| c == s));
                    flagged(Reason::InvalidChoice, rows).map(|v| {
                        v.with_param("choices", json!(choices))
                            .with_message_opt(message.as_ref())
                    })
                }
                TextConstraint::Exists { lookup, message } => {
                    check_exists(lookup, column, message.as_ref())
                }
            };
            violations.extend(violation);
        }

        violations
    }
}

impl ToJsonSchema for TextField {
    fn to_json_schema(&self) -> Json {
        let mut schema = serde_json::Map::new();
        schema.insert("type".to_string(), json!("string"));
        if !self.allow_blank {
            schema.insert("minLength".to_string(), json!(1));
        }
        for constraint in &self.constraints {
            match constraint {
                TextConstraint::MinLength { min, .. } => {
                    schema.insert("minLength".to_string(), json!(min));
                }
                TextConstraint::MaxLength { max, .. } => {
                    schema.insert("maxLength".to_string(), json!(max));
                }
                TextConstraint::Pattern { pattern_str, .. } => {
                    schema.insert("pattern".to_string(), json!(pattern_str));
                }
                TextConstraint::Choices { choices, .. } => {
                    schema.insert("enum".to_string(), json!(choices));
                }
                TextConstraint::Exists { .. } => {}
            }
        }
        Json::Object(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(cells: &[Option<&str>]) -> Column {
        cells.iter().copied().collect()
    }

    fn rows(v: &Violation) -> Vec<usize> {
        v.indexes.iter().copied().collect()
    }

    #[test]
    fn test_coerce_numbers_to_text() {
        let raw = Column::new(vec![Value::Int(42), Value::Float(1.5), Value::from(" a ")]);
        let (coerced, violations) = TextField::new().coerce(&raw);
        assert!(violations.is_empty());
        assert_eq!(
            coerced.values(),
            &[Value::from("42"), Value::from("1.5"), Value::from("a")]
        );
    }

    #[test]
    fn test_coerce_rejects_booleans() {
        let raw = Column::new(vec![Value::Bool(true), Value::from("x"), Value::Bool(false)]);
        let (coerced, violations) = TextField::new().coerce(&raw);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].reason, Reason::InvalidType);
        assert_eq!(rows(&violations[0]), vec![0, 2]);
        assert!(coerced.get(0).unwrap().is_null());
    }

    #[test]
    fn test_coerce_keeps_nulls() {
        let (coerced, violations) = TextField::new().coerce(&column(&[None, Some("x")]));
        assert!(violations.is_empty());
        assert_eq!(coerced.get(0), Some(&Value::Null));
    }

    #[test]
    fn test_no_trim_when_disabled() {
        let (coerced, _) = TextField::new()
            .trim_whitespace(false)
            .coerce(&column(&[Some(" a ")]));
        assert_eq!(coerced.get(0), Some(&Value::from(" a ")));
    }

    #[test]
    fn test_max_len_batches_rows() {
        let field = TextField::new().max_len(3);
        let violations = field.check_constraints(&column(&[
            Some("abcd"),
            Some("ab"),
            None,
            Some("abcdef"),
        ]));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].reason, Reason::MaxLengthValue);
        assert_eq!(violations[0].params.get("limit_value"), Some(&json!(3)));
        assert_eq!(rows(&violations[0]), vec![0, 3]);
    }

    #[test]
    fn test_min_len_and_blank_are_separate() {
        let field = TextField::new().min_len(2);
        let violations = field.check_constraints(&column(&[Some(""), Some("a"), Some("ab")]));
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].reason, Reason::BlankNotAllowed);
        assert_eq!(rows(&violations[0]), vec![0]);
        assert_eq!(violations[1].reason, Reason::MinLengthValue);
        assert_eq!(rows(&violations[1]), vec![1]);
    }

    #[test]
    fn test_allow_blank_lets_min_len_see_blanks() {
        let field = TextField::new().allow_blank(true).min_len(1);
        let violations = field.check_constraints(&column(&[Some("")]));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].reason, Reason::MinLengthValue);
    }

    #[test]
    fn test_pattern_constraint() {
        let field = TextField::new().pattern(r"^\d+$").unwrap();
        let violations = field.check_constraints(&column(&[Some("123"), Some("12a")]));
        assert_eq!(violations[0].reason, Reason::PatternMismatch);
        assert_eq!(violations[0].params.get("pattern"), Some(&json!(r"^\d+$")));
        assert_eq!(rows(&violations[0]), vec![1]);
    }

    #[test]
    fn test_invalid_regex_pattern() {
        assert!(TextField::new().pattern(r"[invalid").is_err());
    }

    #[test]
    fn test_choices_constraint() {
        let field = TextField::new().choices(["kg", "lb"]);
        let violations = field.check_constraints(&column(&[Some("kg"), Some("oz")]));
        assert_eq!(violations[0].reason, Reason::InvalidChoice);
        assert_eq!(violations[0].params.get("choices"), Some(&json!(["kg", "lb"])));
    }

    #[test]
    fn test_custom_error_message() {
        let field = TextField::new().max_len(2).error("name too long");
        let violations = field.check_constraints(&column(&[Some("abc")]));
        assert_eq!(violations[0].message, "name too long");
    }

    #[test]
    fn test_custom_type_error_message() {
        let field = TextField::new().error("must be text");
        let (_, violations) = field.coerce(&Column::new(vec![Value::Bool(true)]));
        assert_eq!(violations[0].message, "must be text");
    }

    #[test]
    fn test_json_schema() {
        let field = TextField::new().max_len(9);
        assert_eq!(
            field.to_json_schema(),
            json!({"type": "string", "minLength": 1, "maxLength": 9})
        );
    }
}
