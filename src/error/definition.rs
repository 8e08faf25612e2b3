//! Schema declaration errors.

use thiserror::Error;

/// A malformed schema declaration.
///
/// These are programming errors in the code that builds a schema. They are
/// reported by [`TableSchemaBuilder::build`](crate::TableSchemaBuilder::build)
/// before any table is validated and are never folded into the per-row
/// error model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// Two fields share a name.
    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),

    /// A field name collides with the reserved table-level key.
    #[error("field name '{0}' is reserved")]
    ReservedName(String),

    /// A field modifier was used before any field was declared.
    #[error("'{0}' must follow a field declaration")]
    OrphanModifier(&'static str),

    /// A hook was registered for a field that is not declared.
    #[error("hook registered for unknown field '{0}'")]
    UnknownHookField(String),

    /// A validator refers to a field that is not declared.
    #[error("validator '{validator}' refers to unknown field '{field}'")]
    UnknownValidatorField { validator: String, field: String },

    /// A unique-together validator was declared without fields.
    #[error("unique-together validator needs at least one field")]
    EmptyUniqueTogether,

    /// A field source adapter could not describe its model.
    #[error("field source '{source_name}' failed: {message}")]
    Source {
        source_name: String,
        message: String,
    },
}
