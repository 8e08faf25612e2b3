//! Table schemas and the validation pipeline.
//!
//! A [`TableSchema`] is an ordered list of [`FieldSpec`]s plus table-level
//! validators, per-field hooks, and an optional save target. It is immutable
//! once built and can be shared across threads; each call to
//! [`TableSchema::validate`] is independent.
//!
//! # Example
//!
//! ```rust
//! use tablecheck::{Field, Table, TableSchema, Value};
//!
//! let schema = TableSchema::builder()
//!     .field("id", Field::integer())
//!     .field("name", Field::text().max_len(9))
//!     .build()
//!     .unwrap();
//!
//! let table = Table::from_rows(
//!     &["id", "name"],
//!     vec![vec![Value::from("234556"), Value::from("Coca-Cola")]],
//! )
//! .unwrap();
//!
//! let validated = schema.validate(&table).into_result().unwrap();
//! assert_eq!(validated.column("id").unwrap().get(0), Some(&Value::Int(234556)));
//! ```

mod builder;
mod hook;

pub use builder::TableSchemaBuilder;
pub use hook::{FieldHook, HookError};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{json, Value as Json};
use stillwater::Validation;
use tracing::{debug, debug_span, trace};

use crate::error::{ValidationErrors, Violation, NON_FIELD_ERRORS};
use crate::field::FieldSpec;
use crate::interop::ToJsonSchema;
use crate::persist::TargetDescriptor;
use crate::serializer::Serializer;
use crate::table::{Column, Table, Value};
use crate::validator::TableValidator;
use crate::ValidationResult;

use hook::run_hook;

/// A declared table shape.
///
/// Build one with [`TableSchema::builder`].
#[derive(Clone)]
pub struct TableSchema {
    pub(crate) fields: Vec<FieldSpec>,
    pub(crate) hooks: HashMap<String, FieldHook>,
    pub(crate) validators: Vec<Arc<dyn TableValidator>>,
    pub(crate) target: Option<TargetDescriptor>,
    pub(crate) null_tokens: Vec<String>,
}

impl TableSchema {
    /// Starts a new schema declaration.
    pub fn builder() -> TableSchemaBuilder {
        TableSchemaBuilder::new()
    }

    /// Returns the declared fields in order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Returns a declared field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name() == name)
    }

    /// Returns the field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldSpec::name)
    }

    /// Returns the table-level validators in run order.
    pub fn validators(&self) -> impl Iterator<Item = &dyn TableValidator> {
        self.validators.iter().map(|v| v.as_ref())
    }

    /// Returns true if a hook is registered for `field`.
    pub fn has_hook(&self, field: &str) -> bool {
        self.hooks.contains_key(field)
    }

    /// Returns the save target, if one was declared.
    pub fn target(&self) -> Option<&TargetDescriptor> {
        self.target.as_ref()
    }

    /// Returns the text tokens read as null.
    pub fn null_tokens(&self) -> &[String] {
        &self.null_tokens
    }

    /// Binds `data` to this schema for one validation run.
    pub fn serializer(&self, data: Table) -> Serializer<'_> {
        Serializer::new(self, data)
    }

    /// Validates and coerces `table`.
    ///
    /// Every field is processed in declaration order and every table-level
    /// validator runs afterwards, so one call reports every error. On
    /// success the returned table holds only the declared fields, under
    /// their field names, in declaration order.
    ///
    /// The input table is never modified.
    pub fn validate(&self, table: &Table) -> ValidationResult<Table> {
        let span = debug_span!("validate", rows = table.n_rows(), fields = self.fields.len());
        let _enter = span.enter();

        let mut events = Vec::new();
        let mut columns = IndexMap::new();
        for spec in &self.fields {
            let (column, violations) = self.validate_field(spec, table);
            trace!(
                field = spec.name(),
                present = column.is_some(),
                violations = violations.len(),
                "field checked"
            );
            events.extend(violations.into_iter().map(|v| v.into_event(spec.name())));
            if let Some(column) = column {
                columns.insert(spec.name().to_string(), column);
            }
        }

        let coerced = Table::from_parts(columns, table.n_rows());
        for validator in &self.validators {
            let violations = validator.check(&coerced);
            trace!(
                validator = validator.name(),
                violations = violations.len(),
                "validator checked"
            );
            events.extend(violations.into_iter().map(|v| v.into_event(NON_FIELD_ERRORS)));
        }

        if events.is_empty() {
            debug!("table is valid");
            Validation::Success(coerced)
        } else {
            debug!(errors = events.len(), "table is invalid");
            Validation::Failure(ValidationErrors::from_vec(events))
        }
    }

    /// Runs one field's steps. Returns `None` for the column when the field
    /// is left out of the validated table.
    fn validate_field(&self, spec: &FieldSpec, table: &Table) -> (Option<Column>, Vec<Violation>) {
        let raw = match table.column(spec.source_column()) {
            Some(column) => self.read_nulls(column),
            None => {
                if let Some(missing) = spec.check_required(table) {
                    return (None, vec![missing]);
                }
                match spec.default_value() {
                    Some(default) => Column::repeat(default.clone(), table.n_rows()),
                    None => return (None, Vec::new()),
                }
            }
        };

        let mut violations: Vec<Violation> = spec.check_null(&raw).into_iter().collect();
        let (mut column, coerce_violations) = spec.coerce(&raw);
        violations.extend(coerce_violations);

        if let Some(hook) = self.hooks.get(spec.name()) {
            let (replaced, hook_violations) = run_hook(spec.name(), hook, column.clone());
            violations.extend(hook_violations);
            violations.extend(spec.check_new_nulls(&column, &replaced));
            column = replaced;
        }

        violations.extend(spec.check_constraints(&column));
        (Some(column), violations)
    }

    fn read_nulls(&self, column: &Column) -> Column {
        if self.null_tokens.is_empty() {
            return column.clone();
        }
        column.map(|value| match value {
            Value::Text(s) if self.null_tokens.iter().any(|t| t == s) => Value::Null,
            other => other.clone(),
        })
    }
}

impl fmt::Debug for TableSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let validators: Vec<&str> = self.validators.iter().map(|v| v.name()).collect();
        let mut hooks: Vec<&String> = self.hooks.keys().collect();
        hooks.sort();
        f.debug_struct("TableSchema")
            .field("fields", &self.fields)
            .field("hooks", &hooks)
            .field("validators", &validators)
            .field("target", &self.target)
            .field("null_tokens", &self.null_tokens)
            .finish()
    }
}

impl ToJsonSchema for TableSchema {
    /// Describes one record of a validated table.
    fn to_json_schema(&self) -> Json {
        let properties: serde_json::Map<String, Json> = self
            .fields
            .iter()
            .map(|spec| {
                let mut schema = spec.field_type().to_json_schema();
                if spec.allows_null() {
                    schema = json!({"anyOf": [schema, {"type": "null"}]});
                }
                if let Some(default) = spec.default_value() {
                    if let Json::Object(map) = &mut schema {
                        map.insert("default".to_string(), default.to_json());
                    }
                }
                (spec.name().to_string(), schema)
            })
            .collect();

        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|spec| spec.is_required())
            .map(FieldSpec::name)
            .collect();

        json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false
        })
    }
}

const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TableSchema>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Reason;
    use crate::field::Field;

    fn unwrap_failure<T: std::fmt::Debug, E>(v: Validation<T, E>) -> E {
        v.into_result().unwrap_err()
    }

    fn rows(indexes: &std::collections::BTreeSet<usize>) -> Vec<usize> {
        indexes.iter().copied().collect()
    }

    #[test]
    fn test_source_renamed_and_filtered() {
        let schema = TableSchema::builder()
            .field("name", Field::text())
            .source("Product Name")
            .field("id", Field::integer())
            .build()
            .unwrap();
        let table = Table::new()
            .with_column("id", vec![Value::from("7")])
            .unwrap()
            .with_column("extra", vec![Value::from("x")])
            .unwrap()
            .with_column("Product Name", vec![Value::from("Tea")])
            .unwrap();

        let validated = schema.validate(&table).into_result().unwrap();
        assert_eq!(validated.column_names().collect::<Vec<_>>(), vec!["name", "id"]);
        assert_eq!(validated.column("id").unwrap().get(0), Some(&Value::Int(7)));
    }

    #[test]
    fn test_missing_required_skips_field_steps() {
        let schema = TableSchema::builder()
            .field("id", Field::integer())
            .field("name", Field::text().max_len(2))
            .build()
            .unwrap();
        let table = Table::new().with_column("name", vec![Value::from("abc")]).unwrap();

        let errors = unwrap_failure(schema.validate(&table));
        let id = errors.for_field("id");
        assert_eq!(id.len(), 1);
        assert_eq!(id[0].reason, Reason::ColumnMissing);
        assert!(id[0].indexes.is_empty());
        assert_eq!(errors.for_field("name")[0].reason, Reason::MaxLengthValue);
    }

    #[test]
    fn test_optional_absent_is_excluded() {
        let schema = TableSchema::builder()
            .field("id", Field::integer())
            .optional("note", Field::text())
            .build()
            .unwrap();
        let table = Table::new().with_column("id", vec![Value::Int(1)]).unwrap();

        let validated = schema.validate(&table).into_result().unwrap();
        assert!(!validated.contains("note"));
    }

    #[test]
    fn test_default_fills_absent_column() {
        let schema = TableSchema::builder()
            .field("id", Field::integer())
            .optional("active", Field::boolean())
            .default("yes")
            .build()
            .unwrap();
        let table = Table::new()
            .with_column("id", vec![Value::Int(1), Value::Int(2)])
            .unwrap();

        let validated = schema.validate(&table).into_result().unwrap();
        let active = validated.column("active").unwrap();
        assert_eq!(active.values(), &[Value::Bool(true), Value::Bool(true)]);
    }

    #[test]
    fn test_null_tokens() {
        let schema = TableSchema::builder()
            .field("qty", Field::integer())
            .allow_null(true)
            .null_tokens(["", "N/A"])
            .build()
            .unwrap();
        let table = Table::new()
            .with_column("qty", vec![Value::from("N/A"), Value::from("3"), Value::from("")])
            .unwrap();

        let validated = schema.validate(&table).into_result().unwrap();
        assert_eq!(
            validated.column("qty").unwrap().values(),
            &[Value::Null, Value::Int(3), Value::Null]
        );
    }

    #[test]
    fn test_null_not_double_reported() {
        let schema = TableSchema::builder()
            .field("qty", Field::integer().min(1))
            .build()
            .unwrap();
        let table = Table::new()
            .with_column("qty", vec![Value::Null, Value::from("x"), Value::Int(0)])
            .unwrap();

        let errors = unwrap_failure(schema.validate(&table));
        let qty = errors.for_field("qty");
        assert_eq!(qty.len(), 3);
        assert_eq!(qty[0].reason, Reason::NullNotAllowed);
        assert_eq!(rows(&qty[0].indexes), vec![0]);
        assert_eq!(qty[1].reason, Reason::NonNumericValue);
        assert_eq!(rows(&qty[1].indexes), vec![1]);
        assert_eq!(qty[2].reason, Reason::MinValue);
        assert_eq!(rows(&qty[2].indexes), vec![2]);
    }

    #[test]
    fn test_hook_replacement_feeds_constraints() {
        let schema = TableSchema::builder()
            .field("code", Field::text().max_len(3))
            .hook("code", |column: &Column| {
                Ok(column.map(|v| match v {
                    Value::Text(s) => Value::from(s.chars().take(3).collect::<String>()),
                    other => other.clone(),
                }))
            })
            .build()
            .unwrap();
        let table = Table::new()
            .with_column("code", vec![Value::from("ABCDEF")])
            .unwrap();

        let validated = schema.validate(&table).into_result().unwrap();
        assert_eq!(validated.column("code").unwrap().get(0), Some(&Value::from("ABC")));
    }

    #[test]
    fn test_input_not_mutated() {
        let schema = TableSchema::builder()
            .field("id", Field::integer())
            .build()
            .unwrap();
        let table = Table::new().with_column("id", vec![Value::from("1")]).unwrap();
        let before = table.clone();
        let _ = schema.validate(&table);
        assert_eq!(table, before);
    }

    #[test]
    fn test_json_schema_export() {
        let schema = TableSchema::builder()
            .field("id", Field::integer().min(1))
            .optional("name", Field::text().max_len(9))
            .allow_null(true)
            .build()
            .unwrap();

        let doc = schema.to_json_schema();
        assert_eq!(doc["type"], "object");
        assert_eq!(doc["required"], json!(["id"]));
        assert_eq!(doc["properties"]["id"]["type"], "integer");
        assert_eq!(doc["properties"]["name"]["anyOf"][1], json!({"type": "null"}));
    }
}
