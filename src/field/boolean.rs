//! Boolean field validation.

use serde_json::{json, Value as Json};

use crate::error::{Reason, Violation};
use crate::interop::ToJsonSchema;
use crate::table::{Column, Value};

use super::traits::{coerce_cells, into_violations, FieldType};

const TRUE_TOKENS: [&str; 6] = ["true", "t", "yes", "y", "on", "1"];
const FALSE_TOKENS: [&str; 6] = ["false", "f", "no", "n", "off", "0"];

/// A field for boolean columns.
///
/// Accepts booleans, the integers `0` and `1`, and the usual textual
/// spellings (`true`/`false`, `yes`/`no`, `t`/`f`, `on`/`off`, `1`/`0`,
/// case-insensitive). Anything else is `INVALID_TYPE`.
#[derive(Debug, Clone, Default)]
pub struct BooleanField {
    type_error_message: Option<String>,
}

impl BooleanField {
    /// Creates a new boolean field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom message for coercion failures.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }
}

fn cast_boolean(value: &Value) -> Result<Value, Reason> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Int(0) => Ok(Value::Bool(false)),
        Value::Int(1) => Ok(Value::Bool(true)),
        Value::Text(s) => {
            let token = s.trim().to_ascii_lowercase();
            if TRUE_TOKENS.contains(&token.as_str()) {
                Ok(Value::Bool(true))
            } else if FALSE_TOKENS.contains(&token.as_str()) {
                Ok(Value::Bool(false))
            } else {
                Err(Reason::InvalidType)
            }
        }
        _ => Err(Reason::InvalidType),
    }
}

impl FieldType for BooleanField {
    fn type_name(&self) -> &'static str {
        "boolean"
    }

    fn coerce(&self, column: &Column) -> (Column, Vec<Violation>) {
        let (coerced, failures) = coerce_cells(column, cast_boolean);
        let violations = into_violations(failures, |v| {
            v.with_message_opt(self.type_error_message.as_ref())
        });
        (coerced, violations)
    }

    fn check_constraints(&self, _column: &Column) -> Vec<Violation> {
        Vec::new()
    }
}

impl ToJsonSchema for BooleanField {
    fn to_json_schema(&self) -> Json {
        json!({"type": "boolean"})
    }
}
