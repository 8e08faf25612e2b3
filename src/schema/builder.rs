//! Schema builder.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{DefinitionError, NON_FIELD_ERRORS};
use crate::field::{FieldSpec, FieldType};
use crate::persist::TargetDescriptor;
use crate::source::FieldSource;
use crate::table::{Column, Value};
use crate::validator::{TableValidator, UniqueTogetherValidator};

use super::hook::{FieldHook, HookError};
use super::TableSchema;

/// Builds a [`TableSchema`] one declaration at a time.
///
/// Field modifiers (`source`, `allow_null`, `required`, `default`) apply to
/// the most recently declared field. Mistakes are remembered and reported by
/// [`build`](Self::build), so the chain never has to be broken up.
///
/// # Example
///
/// ```rust
/// use tablecheck::{Field, TableSchema};
///
/// let schema = TableSchema::builder()
///     .field("id", Field::integer())
///     .source("Product ID")
///     .field("name", Field::text().max_len(9))
///     .optional("unit", Field::text())
///     .default("kg")
///     .unique_together(["id", "name"])
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.field_names().collect::<Vec<_>>(), vec!["id", "name", "unit"]);
/// ```
#[derive(Default)]
pub struct TableSchemaBuilder {
    fields: Vec<FieldSpec>,
    hooks: HashMap<String, FieldHook>,
    validators: Vec<Arc<dyn TableValidator>>,
    target: Option<TargetDescriptor>,
    null_tokens: Vec<String>,
    error: Option<DefinitionError>,
}

impl TableSchemaBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Declares a required, non-nullable field.
    pub fn field<F>(self, name: impl Into<String>, field: F) -> Self
    where
        F: FieldType + 'static,
    {
        self.spec(FieldSpec::new(name, field))
    }

    /// Declares a field whose source column may be absent.
    ///
    /// When absent and no default is set, the field is left out of the
    /// validated table without any error.
    pub fn optional<F>(self, name: impl Into<String>, field: F) -> Self
    where
        F: FieldType + 'static,
    {
        self.spec(FieldSpec::new(name, field).required(false))
    }

    /// Declares a fully configured field.
    pub fn spec(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Declares every field an external model describes.
    pub fn fields_from(mut self, source: &dyn FieldSource) -> Self {
        match source.field_specs() {
            Ok(specs) => self.fields.extend(specs),
            Err(message) => self.fail(DefinitionError::Source {
                source_name: source.name().to_string(),
                message,
            }),
        }
        self
    }

    /// Reads the last declared field from a differently named column.
    pub fn source(self, column: impl Into<String>) -> Self {
        let column = column.into();
        self.modify("source", |spec| spec.set_source(column))
    }

    /// Sets whether the last declared field accepts nulls.
    pub fn allow_null(self, allow: bool) -> Self {
        self.modify("allow_null", |spec| spec.set_allow_null(allow))
    }

    /// Sets whether the last declared field's column must be present.
    pub fn required(self, required: bool) -> Self {
        self.modify("required", |spec| spec.set_required(required))
    }

    /// Fills the last declared field with `value` when its column is absent.
    pub fn default(self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.modify("default", |spec| spec.set_default(value))
    }

    /// Registers a post-coercion hook for a declared field.
    ///
    /// The hook sees the coerced column and may return a replacement.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tablecheck::{Field, HookError, TableSchema, Value};
    ///
    /// let schema = TableSchema::builder()
    ///     .field("code", Field::text())
    ///     .hook("code", |column| {
    ///         Ok(column.map(|v| match v {
    ///             Value::Text(s) => Value::from(s.to_uppercase()),
    ///             other => other.clone(),
    ///         }))
    ///     })
    ///     .build()
    ///     .unwrap();
    /// # let _ = schema;
    /// # let _: Option<HookError> = None;
    /// ```
    pub fn hook<F>(mut self, field: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&Column) -> Result<Column, HookError> + Send + Sync + 'static,
    {
        self.hooks.insert(field.into(), Arc::new(hook));
        self
    }

    /// Adds a table-level validator. Validators run in the order added.
    pub fn validator<V>(mut self, validator: V) -> Self
    where
        V: TableValidator + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Adds a validator shared with other schemas.
    pub fn shared_validator(mut self, validator: Arc<dyn TableValidator>) -> Self {
        self.validators.push(validator);
        self
    }

    /// Requires the combination of `fields` to be unique per row.
    pub fn unique_together<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let validator = UniqueTogetherValidator::new(fields);
        if validator.fields().is_empty() {
            self.fail(DefinitionError::EmptyUniqueTogether);
            return self;
        }
        self.validator(validator)
    }

    /// Sets where validated data is saved.
    pub fn target(mut self, target: TargetDescriptor) -> Self {
        self.target = Some(target);
        self
    }

    /// Treats text cells equal to any token as null before any check.
    pub fn null_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Checks the declaration and returns the schema.
    ///
    /// # Errors
    ///
    /// Returns the first [`DefinitionError`] met while building: a modifier
    /// with no field, a failing field source, a duplicate or reserved field
    /// name, a hook for an unknown field, or a validator naming an unknown
    /// field.
    pub fn build(self) -> Result<TableSchema, DefinitionError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let mut names = HashSet::new();
        for spec in &self.fields {
            if spec.name() == NON_FIELD_ERRORS {
                return Err(DefinitionError::ReservedName(spec.name().to_string()));
            }
            if !names.insert(spec.name()) {
                return Err(DefinitionError::DuplicateField(spec.name().to_string()));
            }
        }

        if let Some(unknown) = self.hooks.keys().find(|f| !names.contains(f.as_str())) {
            return Err(DefinitionError::UnknownHookField(unknown.clone()));
        }

        for validator in &self.validators {
            if let Some(unknown) = validator.fields().iter().find(|f| !names.contains(f.as_str())) {
                return Err(DefinitionError::UnknownValidatorField {
                    validator: validator.name().to_string(),
                    field: unknown.clone(),
                });
            }
        }

        Ok(TableSchema {
            fields: self.fields,
            hooks: self.hooks,
            validators: self.validators,
            target: self.target,
            null_tokens: self.null_tokens,
        })
    }

    fn modify<F>(mut self, modifier: &'static str, apply: F) -> Self
    where
        F: FnOnce(&mut FieldSpec),
    {
        match self.fields.last_mut() {
            Some(spec) => apply(spec),
            None => self.fail(DefinitionError::OrphanModifier(modifier)),
        }
        self
    }

    fn fail(&mut self, error: DefinitionError) {
        self.error.get_or_insert(error);
    }
}
