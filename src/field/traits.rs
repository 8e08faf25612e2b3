//! Traits for field polymorphism.
//!
//! This module provides the [`FieldType`] trait that lets the different field
//! types (text, integer, date, ...) be declared side by side in one schema,
//! plus the column-wide helpers they share.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::error::{Reason, Violation};
use crate::interop::ToJsonSchema;
use crate::table::{Column, Value};

/// A column type that can coerce raw cells and check its own constraints.
///
/// Both operations work on a whole column at once and return violations
/// batched by reason: one [`Violation`] per distinct failure, carrying every
/// row position that failed that way.
///
/// Implementations must be stateless with respect to validation runs; the
/// `Send + Sync` bounds let one schema be shared by concurrent runs.
///
/// # Example
///
/// ```rust
/// use tablecheck::{Column, Field, FieldType, Reason, Value};
///
/// let field = Field::integer();
/// let raw = Column::new(vec![Value::from("12"), Value::from("abc"), Value::Null]);
///
/// let (coerced, violations) = field.coerce(&raw);
/// assert_eq!(coerced.get(0), Some(&Value::Int(12)));
/// assert_eq!(violations.len(), 1);
/// assert_eq!(violations[0].reason, Reason::NonNumericValue);
/// ```
pub trait FieldType: ToJsonSchema + Send + Sync {
    /// Short name of the semantic type (`"text"`, `"integer"`, ...).
    fn type_name(&self) -> &'static str;

    /// Casts every non-null cell to this field's type.
    ///
    /// Null cells pass through untouched. Cells that fail to cast become
    /// null in the returned column and are reported once per failure reason.
    fn coerce(&self, column: &Column) -> (Column, Vec<Violation>);

    /// Checks type-specific constraints on an already coerced column.
    ///
    /// Null cells are never flagged here.
    fn check_constraints(&self, column: &Column) -> Vec<Violation>;
}

/// Failure positions grouped by reason, in first-seen order.
pub(crate) type Failures = IndexMap<Reason, BTreeSet<usize>>;

/// Applies `cast` to every non-null cell and collects failures by reason.
pub(crate) fn coerce_cells<F>(column: &Column, cast: F) -> (Column, Failures)
where
    F: Fn(&Value) -> Result<Value, Reason>,
{
    let mut failures = Failures::new();
    let values = column
        .iter()
        .enumerate()
        .map(|(i, value)| {
            if value.is_null() {
                return value.clone();
            }
            cast(value).unwrap_or_else(|reason| {
                failures.entry(reason).or_default().insert(i);
                Value::Null
            })
        })
        .collect::<Vec<_>>();
    (Column::new(values), failures)
}

/// Turns grouped failures into violations, letting the field attach params.
pub(crate) fn into_violations<F>(failures: Failures, describe: F) -> Vec<Violation>
where
    F: Fn(Violation) -> Violation,
{
    failures
        .into_iter()
        .map(|(reason, rows)| describe(Violation::new(reason, rows)))
        .collect()
}

/// Returns a violation only if some rows were flagged.
pub(crate) fn flagged(reason: Reason, rows: BTreeSet<usize>) -> Option<Violation> {
    if rows.is_empty() {
        None
    } else {
        Some(Violation::new(reason, rows))
    }
}
