//! In-memory tables.
//!
//! This module provides [`Table`], an ordered collection of named
//! [`Column`]s that all share the same length. Row position is the unit of
//! error addressing throughout the crate.

mod column;
mod value;

pub use column::Column;
pub use value::Value;

use indexmap::IndexMap;
use thiserror::Error;

/// Errors raised while assembling a table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// A column's length differs from the table's row count.
    #[error("column '{column}' has {got} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    /// A column with the same name already exists.
    #[error("column '{0}' already exists")]
    DuplicateColumn(String),

    /// Records input was not a JSON array of objects.
    #[error("records must be an array of objects, got {0}")]
    NotRecords(&'static str),

    /// A JSON cell could not be represented as a [`Value`].
    #[error("unsupported value in column '{column}' at row {row}: {kind}")]
    UnsupportedValue {
        column: String,
        row: usize,
        kind: &'static str,
    },
}

/// An ordered collection of equally long named columns.
///
/// Tables are never mutated by validation; every pipeline step produces new
/// columns in a working copy.
///
/// # Example
///
/// ```rust
/// use tablecheck::{Table, Value};
///
/// let table = Table::from_rows(
///     &["id", "name"],
///     vec![
///         vec![Value::from("234556"), Value::from("Coca-Cola")],
///         vec![Value::Null, Value::from("Pepsi")],
///     ],
/// )
/// .unwrap();
///
/// assert_eq!(table.n_rows(), 2);
/// assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["id", "name"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: IndexMap<String, Column>,
    rows: usize,
}

impl Table {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column and returns the table for chaining.
    ///
    /// # Errors
    ///
    /// Returns `TableError::DuplicateColumn` if the name is taken, or
    /// `TableError::LengthMismatch` if the length differs from existing columns.
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        column: impl Into<Column>,
    ) -> Result<Self, TableError> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(TableError::DuplicateColumn(name));
        }
        self.set_column(name, column.into())?;
        Ok(self)
    }

    /// Inserts or replaces a column, keeping its position if it exists.
    ///
    /// # Errors
    ///
    /// Returns `TableError::LengthMismatch` if the table already has columns
    /// of a different length.
    pub fn set_column(&mut self, name: impl Into<String>, column: Column) -> Result<(), TableError> {
        let name = name.into();
        let replacing_only = self.columns.len() == 1 && self.columns.contains_key(&name);
        if !self.columns.is_empty() && !replacing_only && column.len() != self.rows {
            return Err(TableError::LengthMismatch {
                column: name,
                expected: self.rows,
                got: column.len(),
            });
        }
        self.rows = column.len();
        self.columns.insert(name, column);
        Ok(())
    }

    /// Builds a table from column names and row-major data.
    ///
    /// Short rows are padded with nulls.
    ///
    /// # Errors
    ///
    /// Returns `TableError::DuplicateColumn` for repeated column names.
    pub fn from_rows(names: &[&str], rows: Vec<Vec<Value>>) -> Result<Self, TableError> {
        let mut columns: Vec<Vec<Value>> = vec![Vec::with_capacity(rows.len()); names.len()];
        for row in rows {
            let mut cells = row.into_iter();
            for column in columns.iter_mut() {
                column.push(cells.next().unwrap_or(Value::Null));
            }
        }

        names
            .iter()
            .zip(columns)
            .try_fold(Table::new(), |table, (name, values)| {
                table.with_column(*name, Column::new(values))
            })
    }

    /// Builds a table from a JSON array of objects.
    ///
    /// Columns are the union of all object keys in first-seen order; a key
    /// missing from a record becomes a null cell.
    ///
    /// # Errors
    ///
    /// Returns `TableError::NotRecords` if the input is not an array of
    /// objects, or `TableError::UnsupportedValue` for nested arrays/objects.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tablecheck::{Table, Value};
    /// use serde_json::json;
    ///
    /// let table = Table::from_records(&json!([
    ///     {"id": "1", "name": "Coca-Cola"},
    ///     {"id": "2"}
    /// ]))
    /// .unwrap();
    ///
    /// assert_eq!(table.column("name").unwrap().get(1), Some(&Value::Null));
    /// ```
    pub fn from_records(records: &serde_json::Value) -> Result<Self, TableError> {
        let items = records
            .as_array()
            .ok_or_else(|| TableError::NotRecords(json_type_name(records)))?;

        let mut columns: IndexMap<String, Vec<Value>> = IndexMap::new();
        for (row, item) in items.iter().enumerate() {
            let object = item
                .as_object()
                .ok_or_else(|| TableError::NotRecords(json_type_name(item)))?;
            for (key, cell) in object {
                let values = columns
                    .entry(key.clone())
                    .or_insert_with(|| vec![Value::Null; row]);
                values.push(json_to_value(cell, key, row)?);
            }
            for values in columns.values_mut() {
                if values.len() == row {
                    values.push(Value::Null);
                }
            }
        }

        let rows = items.len();
        let mut table = Table::new();
        for (name, values) in columns {
            table.set_column(name, Column::new(values))?;
        }
        table.rows = rows;
        Ok(table)
    }

    /// Assembles a table from columns already known to have `rows` cells.
    pub(crate) fn from_parts(columns: IndexMap<String, Column>, rows: usize) -> Self {
        debug_assert!(columns.values().all(|c| c.len() == rows));
        Self { columns, rows }
    }

    /// Returns the number of rows.
    pub fn n_rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if a column with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Returns the column with this name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Returns the column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Returns an iterator over `(name, column)` pairs in order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the cells of one row in column order.
    pub fn row(&self, position: usize) -> Option<Vec<&Value>> {
        if position >= self.rows {
            return None;
        }
        self.columns.values().map(|c| c.get(position)).collect()
    }

    /// Converts the table into a JSON array of objects.
    pub fn to_records(&self) -> serde_json::Value {
        let records = (0..self.rows)
            .map(|i| {
                let object = self
                    .columns
                    .iter()
                    .map(|(name, column)| {
                        let cell = column.get(i).map(Value::to_json).unwrap_or_default();
                        (name.clone(), cell)
                    })
                    .collect::<serde_json::Map<_, _>>();
                serde_json::Value::Object(object)
            })
            .collect();
        serde_json::Value::Array(records)
    }
}

fn json_to_value(cell: &serde_json::Value, column: &str, row: usize) -> Result<Value, TableError> {
    use serde_json::Value as Json;

    match cell {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => Ok(n
            .as_i64()
            .map(Value::Int)
            .unwrap_or_else(|| Value::Float(n.as_f64().unwrap_or(f64::NAN)))),
        Json::String(s) => Ok(Value::Text(s.clone())),
        other => Err(TableError::UnsupportedValue {
            column: column.to_string(),
            row,
            kind: json_type_name(other),
        }),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value as Json;

    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
