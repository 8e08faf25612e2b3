//! Per-field declaration.

use std::fmt;
use std::sync::Arc;

use crate::error::{Reason, Violation};
use crate::table::{Column, Table, Value};

use super::traits::{flagged, FieldType};

/// One declared column: its name, type, and presence/nullability rules.
///
/// By default a field is required (its source column must be present), does
/// not allow nulls, and reads from a column with the same name as the field.
///
/// # Example
///
/// ```rust
/// use tablecheck::{Field, FieldSpec};
///
/// let spec = FieldSpec::new("name", Field::text().max_len(9))
///     .source("Product Name")
///     .allow_null(true);
///
/// assert_eq!(spec.name(), "name");
/// assert_eq!(spec.source_column(), "Product Name");
/// assert!(spec.is_required());
/// ```
#[derive(Clone)]
pub struct FieldSpec {
    name: String,
    field: Arc<dyn FieldType>,
    source: Option<String>,
    required: bool,
    allow_null: bool,
    default: Option<Value>,
}

impl FieldSpec {
    /// Creates a required, non-nullable field.
    pub fn new<F>(name: impl Into<String>, field: F) -> Self
    where
        F: FieldType + 'static,
    {
        Self {
            name: name.into(),
            field: Arc::new(field),
            source: None,
            required: true,
            allow_null: false,
            default: None,
        }
    }

    /// Reads the field from a differently named source column.
    pub fn source(mut self, column: impl Into<String>) -> Self {
        self.source = Some(column.into());
        self
    }

    /// Sets whether the source column must be present (default: true).
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets whether null cells are accepted (default: false).
    pub fn allow_null(mut self, allow: bool) -> Self {
        self.allow_null = allow;
        self
    }

    /// Fills an absent source column with `value`. Implies not required.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self.required = false;
        self
    }

    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the column this field reads from.
    pub fn source_column(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.name)
    }

    /// Returns true if the source column must be present.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns true if null cells are accepted.
    pub fn allows_null(&self) -> bool {
        self.allow_null
    }

    /// Returns the default used when the source column is absent.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns the field type.
    pub fn field_type(&self) -> &dyn FieldType {
        self.field.as_ref()
    }

    /// Reports `COLUMN_MISSING` if the field is required and its source
    /// column is absent. The violation has no row positions.
    pub fn check_required(&self, table: &Table) -> Option<Violation> {
        if self.required && !table.contains(self.source_column()) {
            Some(Violation::table_wide(Reason::ColumnMissing))
        } else {
            None
        }
    }

    /// Reports `NULL_NOT_ALLOWED` at every null position, unless nulls are
    /// allowed.
    pub fn check_null(&self, column: &Column) -> Option<Violation> {
        if self.allow_null {
            return None;
        }
        flagged(Reason::NullNotAllowed, column.null_positions())
    }

    /// Flags positions that are null in `after` but were not in `before`.
    pub(crate) fn check_new_nulls(&self, before: &Column, after: &Column) -> Option<Violation> {
        if self.allow_null {
            return None;
        }
        let previous = before.null_positions();
        let introduced = after
            .null_positions()
            .into_iter()
            .filter(|i| !previous.contains(i))
            .collect();
        flagged(Reason::NullNotAllowed, introduced)
    }

    /// Coerces the column to this field's type.
    pub fn coerce(&self, column: &Column) -> (Column, Vec<Violation>) {
        self.field.coerce(column)
    }

    /// Checks this field's type-specific constraints.
    pub fn check_constraints(&self, column: &Column) -> Vec<Violation> {
        self.field.check_constraints(column)
    }

    pub(crate) fn set_source(&mut self, column: String) {
        self.source = Some(column);
    }

    pub(crate) fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    pub(crate) fn set_allow_null(&mut self, allow: bool) {
        self.allow_null = allow;
    }

    pub(crate) fn set_default(&mut self, value: Value) {
        self.default = Some(value);
        self.required = false;
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("type", &self.field.type_name())
            .field("source", &self.source_column())
            .field("required", &self.required)
            .field("allow_null", &self.allow_null)
            .field("default", &self.default)
            .finish()
    }
}
