//! # Tablecheck
//!
//! A table validation library that checks whole columns at once and
//! accumulates ALL validation errors, reporting every failure of a table in
//! one pass rather than stopping at the first one.
//!
//! ## Overview
//!
//! A [`TableSchema`] declares the expected fields of a table: their types,
//! source column names, nullability and constraints, plus table-level rules
//! such as unique-together keys. Validating a [`Table`] coerces each column
//! to its field's type, runs optional per-field hooks and cross-field
//! validators, and returns either the coerced table or a non-empty batch of
//! [`ErrorEvent`]s. Each event is batched by reason and carries every
//! affected row position.
//!
//! Results use stillwater's `Validation` type, so expected failures are
//! values and error batches combine like any other `Semigroup`.
//!
//! ## Core Types
//!
//! - [`Field`]: Entry point for creating field types (`Field::text()`, ...)
//! - [`TableSchema`]: The declared table shape and validation pipeline
//! - [`Serializer`]: One validation run, exposing errors and validated data
//! - [`ValidationErrors`]: A non-empty batch of [`ErrorEvent`]s, viewable as
//!   [`RawErrors`] or [`HumanErrors`]
//!
//! ## Example
//!
//! ```rust
//! use tablecheck::{Field, Reason, Serializer, Table, TableSchema, Value};
//! use serde_json::json;
//!
//! let schema = TableSchema::builder()
//!     .field("id", Field::integer())
//!     .field("name", Field::text().max_len(9))
//!     .unique_together(["id", "name"])
//!     .build()
//!     .unwrap();
//!
//! let table = Table::from_rows(
//!     &["id", "name"],
//!     vec![
//!         vec![Value::from("234556"), Value::from("Coca-Cola")],
//!         vec![Value::from("234556"), Value::from("Coca-Cola")],
//!         vec![Value::from("234556"), Value::Null],
//!         vec![Value::Null, Value::from("0123456789")],
//!     ],
//! )
//! .unwrap();
//!
//! let mut serializer = Serializer::new(&schema, table);
//! assert!(!serializer.validate());
//!
//! let human = serializer.human_errors().unwrap();
//! assert_eq!(human.find("id", Reason::NullNotAllowed).unwrap().indexes, vec![3]);
//! assert_eq!(human.find("name", Reason::MaxLengthValue).unwrap().indexes, vec![3]);
//! assert_eq!(
//!     human.to_json()["non_field_errors"],
//!     json!([{
//!         "reason": "NON_UNIQUE_TOGETHER",
//!         "indexes": [1],
//!         "unique_together_fields": ["id", "name"]
//!     }])
//! );
//! ```

pub mod error;
pub mod field;
pub mod interop;
pub mod persist;
pub mod registry;
pub mod report;
pub mod schema;
pub mod serializer;
pub mod source;
pub mod table;
pub mod validator;

pub use error::{
    DefinitionError, ErrorEvent, Params, Reason, ValidationErrors, Violation, NON_FIELD_ERRORS,
};
pub use field::{
    BooleanField, DateField, DateTimeField, Field, FieldSpec, FieldType, FloatField,
    IdentifierLookup, ImageField, IntegerField, KnownIdentifiers, TextField,
    DEFAULT_IMAGE_EXTENSIONS,
};
pub use interop::ToJsonSchema;
pub use persist::{Persister, SaveError, TargetDescriptor};
pub use registry::{RegistryError, SchemaRegistry};
pub use report::{ErrorDetail, GroupedError, HumanErrors, RawErrors};
pub use schema::{FieldHook, HookError, TableSchema, TableSchemaBuilder};
pub use serializer::{Serializer, SerializerError};
pub use source::FieldSource;
pub use table::{Column, Table, TableError, Value};
pub use validator::{FnValidator, TableValidator, UniqueTogetherValidator};

/// Type alias for validation results using ValidationErrors
pub type ValidationResult<T> = stillwater::Validation<T, ValidationErrors>;
