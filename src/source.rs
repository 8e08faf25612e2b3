//! External field definitions.

use crate::field::FieldSpec;

/// Describes fields on behalf of an external model.
///
/// Adapters over database or ORM metadata implement this so a schema can be
/// declared from the model instead of by hand. The schema only relies on the
/// returned [`FieldSpec`]s, not on how they were produced.
///
/// # Example
///
/// ```rust
/// use tablecheck::{Field, FieldSource, FieldSpec, TableSchema};
///
/// struct ProductModel;
///
/// impl FieldSource for ProductModel {
///     fn name(&self) -> &str {
///         "product"
///     }
///
///     fn field_specs(&self) -> Result<Vec<FieldSpec>, String> {
///         Ok(vec![
///             FieldSpec::new("id", Field::integer()),
///             FieldSpec::new("name", Field::text().max_len(9)),
///         ])
///     }
/// }
///
/// let schema = TableSchema::builder().fields_from(&ProductModel).build().unwrap();
/// assert_eq!(schema.field_names().collect::<Vec<_>>(), vec!["id", "name"]);
/// ```
pub trait FieldSource {
    /// Name of the model, used in error reports.
    fn name(&self) -> &str;

    /// Returns the model's fields in declaration order.
    fn field_specs(&self) -> Result<Vec<FieldSpec>, String>;
}
