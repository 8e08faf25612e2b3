//! Field definitions.
//!
//! This module provides the field types a table schema is declared with.
//! Each field type coerces a whole column of raw cells and checks its own
//! constraints, returning violations batched by reason rather than one per
//! row.
//!
//! # Example
//!
//! ```rust
//! use tablecheck::{Column, Field, FieldType, Value};
//!
//! let field = Field::text().min_len(1).max_len(100);
//!
//! let (coerced, violations) = field.coerce(&Column::new(vec![Value::from("hello")]));
//! assert!(violations.is_empty());
//! assert!(field.check_constraints(&coerced).is_empty());
//! ```

mod boolean;
mod image;
mod lookup;
mod numeric;
mod spec;
mod string;
mod temporal;
mod traits;

pub use boolean::BooleanField;
pub use image::{ImageField, DEFAULT_IMAGE_EXTENSIONS};
pub use lookup::{IdentifierLookup, KnownIdentifiers};
pub use numeric::{FloatField, IntegerField};
pub use spec::FieldSpec;
pub use string::TextField;
pub use temporal::{DateField, DateTimeField, DEFAULT_DATETIME_FORMAT, DEFAULT_DATE_FORMAT};
pub use traits::FieldType;

/// Entry point for creating field types.
///
/// `Field` provides factory methods for the supported semantic types. Each
/// returned type supports constraints through a builder pattern.
///
/// # Example
///
/// ```rust
/// use tablecheck::Field;
///
/// let name = Field::text().max_len(9);
/// let id = Field::integer().min(1);
/// let sku = Field::text().pattern(r"^[A-Z]{3}-\d+$").unwrap().error("bad SKU");
/// ```
pub struct Field;

impl Field {
    /// Creates a new text field.
    pub fn text() -> TextField {
        TextField::new()
    }

    /// Creates a new integer field.
    pub fn integer() -> IntegerField {
        IntegerField::new()
    }

    /// Creates a new float field.
    pub fn float() -> FloatField {
        FloatField::new()
    }

    /// Creates a new boolean field.
    pub fn boolean() -> BooleanField {
        BooleanField::new()
    }

    /// Creates a new date field.
    pub fn date() -> DateField {
        DateField::new()
    }

    /// Creates a new datetime field.
    pub fn datetime() -> DateTimeField {
        DateTimeField::new()
    }

    /// Creates a new image file field.
    pub fn image() -> ImageField {
        ImageField::new()
    }
}
