//! Table-level validators.
//!
//! This module provides the [`TableValidator`] trait for rules that look at
//! several columns at once, the built-in [`UniqueTogetherValidator`], and
//! [`FnValidator`] for ad-hoc rules written as closures.
//!
//! Validators run after every field has been coerced, on a table holding only
//! the declared fields under their field names. Their violations are reported
//! under the reserved `non_field_errors` key.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde_json::json;

use crate::error::{Reason, Violation};
use crate::table::Table;

/// A stateless rule over the whole table.
///
/// Implementations must not keep per-call state: one validator instance may
/// be shared by many schemas and by concurrent validation runs.
pub trait TableValidator: Send + Sync {
    /// Short name used in logs and definition errors.
    fn name(&self) -> &str;

    /// Field names this validator reads. Each must be declared by the schema.
    fn fields(&self) -> &[String];

    /// Checks the coerced table and returns one violation per failure reason.
    fn check(&self, table: &Table) -> Vec<Violation>;
}

/// Flags rows whose combination of values in `fields` repeats an earlier row.
///
/// The first occurrence of each key is kept and never flagged; every later
/// occurrence is. Rows with a null in any key column take no part in the
/// check.
///
/// # Example
///
/// ```rust
/// use tablecheck::{Reason, Table, TableValidator, UniqueTogetherValidator, Value};
///
/// let table = Table::new()
///     .with_column("id", vec![Value::Int(1), Value::Int(1), Value::Int(2)])
///     .unwrap()
///     .with_column("name", vec![Value::from("a"), Value::from("a"), Value::from("a")])
///     .unwrap();
///
/// let violations = UniqueTogetherValidator::new(["id", "name"]).check(&table);
/// assert_eq!(violations[0].reason, Reason::NonUniqueTogether);
/// assert_eq!(violations[0].indexes.iter().copied().collect::<Vec<_>>(), vec![1]);
/// ```
#[derive(Debug, Clone)]
pub struct UniqueTogetherValidator {
    fields: Vec<String>,
    message: Option<String>,
}

impl UniqueTogetherValidator {
    /// Creates a validator over the given key columns.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            message: None,
        }
    }

    /// Sets a custom error message.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl TableValidator for UniqueTogetherValidator {
    fn name(&self) -> &str {
        "unique_together"
    }

    fn fields(&self) -> &[String] {
        &self.fields
    }

    fn check(&self, table: &Table) -> Vec<Violation> {
        let columns = match self
            .fields
            .iter()
            .map(|name| table.column(name))
            .collect::<Option<Vec<_>>>()
        {
            Some(columns) if !columns.is_empty() => columns,
            // A missing key column is already reported against its field.
            _ => return Vec::new(),
        };

        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for row in 0..table.n_rows() {
            let cells: Option<Vec<String>> = columns
                .iter()
                .map(|column| {
                    column
                        .get(row)
                        .filter(|value| !value.is_null())
                        .map(|value| value.hash_key())
                })
                .collect();
            let Some(key) = cells else {
                continue;
            };
            if !seen.insert(key) {
                duplicates.push(row);
            }
        }

        if duplicates.is_empty() {
            return Vec::new();
        }
        vec![Violation::new(Reason::NonUniqueTogether, duplicates)
            .with_param("unique_together_fields", json!(self.fields))
            .with_message_opt(self.message.as_ref())]
    }
}

/// Closure type stored by [`FnValidator`].
pub(crate) type CheckFn = Arc<dyn Fn(&Table) -> Vec<Violation> + Send + Sync>;

/// A table-level rule written as a closure.
///
/// # Example
///
/// ```rust
/// use tablecheck::{FnValidator, Reason, Table, TableValidator, Value, Violation};
///
/// let stock = FnValidator::new("reserved_le_stock", ["stock", "reserved"], |table| {
///     let (Some(stock), Some(reserved)) = (table.column("stock"), table.column("reserved")) else {
///         return Vec::new();
///     };
///     let rows: Vec<usize> = stock
///         .iter()
///         .zip(reserved.iter())
///         .enumerate()
///         .filter(|(_, (s, r))| matches!((s.as_i64(), r.as_i64()), (Some(s), Some(r)) if r > s))
///         .map(|(i, _)| i)
///         .collect();
///     if rows.is_empty() {
///         Vec::new()
///     } else {
///         vec![Violation::new(Reason::MaxValue, rows).with_message("reserved exceeds stock")]
///     }
/// });
///
/// let table = Table::new()
///     .with_column("stock", vec![Value::Int(5), Value::Int(1)])
///     .unwrap()
///     .with_column("reserved", vec![Value::Int(2), Value::Int(3)])
///     .unwrap();
///
/// assert_eq!(stock.check(&table)[0].indexes.len(), 1);
/// ```
#[derive(Clone)]
pub struct FnValidator {
    name: String,
    fields: Vec<String>,
    check: CheckFn,
}

impl FnValidator {
    /// Creates a validator from a closure.
    pub fn new<I, S, F>(name: impl Into<String>, fields: I, check: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Table) -> Vec<Violation> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            check: Arc::new(check),
        }
    }
}

impl TableValidator for FnValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn fields(&self) -> &[String] {
        &self.fields
    }

    fn check(&self, table: &Table) -> Vec<Violation> {
        (self.check)(table)
    }
}

impl fmt::Debug for FnValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnValidator")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish()
    }
}

const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<UniqueTogetherValidator>();
    assert_send_sync::<FnValidator>();
};
