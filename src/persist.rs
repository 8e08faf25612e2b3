//! Persistence boundary.
//!
//! Writing validated data is the host's job. This module only describes the
//! interface the [`Serializer`](crate::Serializer) hands a validated table to.

use indexmap::IndexMap;
use thiserror::Error;

use crate::error::ValidationErrors;
use crate::table::Table;

/// Opaque description of where validated data goes.
///
/// The core never interprets it; it is passed through to the [`Persister`].
///
/// # Example
///
/// ```rust
/// use tablecheck::TargetDescriptor;
/// use serde_json::json;
///
/// let target = TargetDescriptor::new("products")
///     .with_option("conflict", json!("upsert"))
///     .with_option("key", json!(["id"]));
///
/// assert_eq!(target.name(), "products");
/// assert_eq!(target.option("conflict"), Some(&json!("upsert")));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TargetDescriptor {
    name: String,
    options: IndexMap<String, serde_json::Value>,
}

impl TargetDescriptor {
    /// Creates a descriptor for the named target.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: IndexMap::new(),
        }
    }

    /// Adds a storage-specific option.
    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// Returns the target name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns an option by key.
    pub fn option(&self, key: &str) -> Option<&serde_json::Value> {
        self.options.get(key)
    }

    /// Returns every option in insertion order.
    pub fn options(&self) -> &IndexMap<String, serde_json::Value> {
        &self.options
    }
}

/// Writes a validated table to external storage.
pub trait Persister {
    /// What a successful write reports (row count, generated keys, ...).
    type Output;
    /// Storage failure.
    type Error;

    /// Persists `table`, which has already passed validation.
    fn persist(&self, table: &Table, target: &TargetDescriptor) -> Result<Self::Output, Self::Error>;
}

/// Why a save did not reach the persister, or what the persister reported.
#[derive(Debug, Error)]
pub enum SaveError<E> {
    /// `validate` has not been called on this serializer.
    #[error("data must be validated before it is saved")]
    NotValidated,

    /// Validation failed; nothing was written.
    #[error("cannot save invalid data: {0}")]
    Invalid(ValidationErrors),

    /// The schema declares no target to save to.
    #[error("schema has no save target")]
    NoTarget,

    /// The persister failed.
    #[error("persist failed: {0}")]
    Persist(E),
}
