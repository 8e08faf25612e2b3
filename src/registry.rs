//! Schema registry for named schema storage.
//!
//! This module provides the [`SchemaRegistry`] type that stores named table
//! schemas so a host can validate incoming tables by name, one at a time or
//! as a parallel batch.

use parking_lot::RwLock;
use rayon::prelude::*;
use serde_json::{json, Value as Json};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::interop::ToJsonSchema;
use crate::schema::TableSchema;
use crate::table::Table;
use crate::ValidationResult;

/// Type alias for the schema storage map.
type SchemaMap = Arc<RwLock<HashMap<String, Arc<TableSchema>>>>;

/// A thread-safe registry for storing and retrieving named schemas.
///
/// # Thread Safety
///
/// The registry uses `Arc<RwLock<...>>` for thread-safe access:
/// - Multiple threads can validate concurrently (read-only access)
/// - Registration operations are serialized (write access)
///
/// Clones share the same storage.
///
/// # Example
///
/// ```rust
/// use tablecheck::{Field, SchemaRegistry, Table, TableSchema, Value};
///
/// let registry = SchemaRegistry::new();
/// registry
///     .register(
///         "product",
///         TableSchema::builder()
///             .field("id", Field::integer())
///             .build()
///             .unwrap(),
///     )
///     .unwrap();
///
/// let table = Table::new().with_column("id", vec![Value::from("7")]).unwrap();
/// let result = registry.validate("product", &table).unwrap();
/// assert!(result.is_success());
/// ```
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    schemas: SchemaMap,
}

impl SchemaRegistry {
    /// Creates a new empty schema registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema with the given name.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateName` if the name is already registered.
    pub fn register(
        &self,
        name: impl Into<String>,
        schema: impl Into<Arc<TableSchema>>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        let mut schemas = self.schemas.write();

        if schemas.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }

        debug!(schema = %name, "registered schema");
        schemas.insert(name, schema.into());
        Ok(())
    }

    /// Retrieves a schema by name.
    ///
    /// Returns `None` if no schema with the given name is registered.
    pub fn get(&self, name: &str) -> Option<Arc<TableSchema>> {
        self.schemas.read().get(name).cloned()
    }

    /// Returns the registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.schemas.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    /// Returns true if no schema is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }

    /// Validates a table against a named schema.
    ///
    /// The lock is released before validation starts, so long runs never
    /// block registration.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::SchemaNotFound` if the schema name doesn't exist.
    pub fn validate(
        &self,
        schema_name: &str,
        table: &Table,
    ) -> Result<ValidationResult<Table>, RegistryError> {
        let schema = self
            .get(schema_name)
            .ok_or_else(|| RegistryError::SchemaNotFound(schema_name.to_string()))?;
        Ok(schema.validate(table))
    }

    /// Validates independent `(schema name, table)` jobs in parallel.
    ///
    /// Results come back in job order. An unknown name fails only its own
    /// job.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tablecheck::{Field, SchemaRegistry, Table, TableSchema, Value};
    ///
    /// let registry = SchemaRegistry::new();
    /// registry
    ///     .register("ids", TableSchema::builder().field("id", Field::integer()).build().unwrap())
    ///     .unwrap();
    ///
    /// let good = Table::new().with_column("id", vec![Value::Int(1)]).unwrap();
    /// let bad = Table::new().with_column("id", vec![Value::Null]).unwrap();
    ///
    /// let results = registry.validate_batch(&[("ids", &good), ("ids", &bad), ("nope", &good)]);
    /// assert!(results[0].as_ref().unwrap().is_success());
    /// assert!(results[1].as_ref().unwrap().is_failure());
    /// assert!(results[2].is_err());
    /// ```
    pub fn validate_batch(
        &self,
        jobs: &[(&str, &Table)],
    ) -> Vec<Result<ValidationResult<Table>, RegistryError>> {
        debug!(jobs = jobs.len(), "validating batch");
        jobs.par_iter()
            .map(|(name, table)| self.validate(name, table))
            .collect()
    }

    /// Exports all registered schemas as a JSON Schema document with $defs.
    pub fn to_json_schema(&self) -> Json {
        let schemas = self.schemas.read();
        let mut defs = serde_json::Map::new();

        for (name, schema) in schemas.iter() {
            defs.insert(name.clone(), schema.to_json_schema());
        }

        json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "$defs": defs
        })
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("schemas", &self.names())
            .finish()
    }
}

/// Errors that can occur during registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Attempted to register a schema with a name that already exists.
    #[error("schema '{0}' already registered")]
    DuplicateName(String),

    /// Attempted to validate with a schema name that doesn't exist.
    #[error("schema '{0}' not found")]
    SchemaNotFound(String),
}
