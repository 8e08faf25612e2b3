//! Columns of cells.
//!
//! A [`Column`] is an ordered sequence of [`Value`]s addressed by row
//! position. All checks in this crate are expressed as whole-column passes
//! over it that yield the set of positions they flag.

use std::collections::BTreeSet;

use super::value::Value;

/// An ordered sequence of cells aligned by row position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Column {
    values: Vec<Value>,
}

impl Column {
    /// Creates a column from cell values.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Creates a column of `len` copies of `value`.
    pub fn repeat(value: Value, len: usize) -> Self {
        Self {
            values: vec![value; len],
        }
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the cell at `position`.
    pub fn get(&self, position: usize) -> Option<&Value> {
        self.values.get(position)
    }

    /// Returns an iterator over the cells.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Returns the cells as a slice.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consumes the column and returns its cells.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Returns the positions of null cells.
    pub fn null_positions(&self) -> BTreeSet<usize> {
        self.positions(Value::is_null)
    }

    /// Returns the positions whose cell satisfies `predicate`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tablecheck::{Column, Value};
    ///
    /// let column = Column::from(vec![Value::Int(1), Value::Int(20), Value::Int(3)]);
    /// let big = column.positions(|v| v.as_i64().is_some_and(|n| n > 10));
    /// assert_eq!(big.into_iter().collect::<Vec<_>>(), vec![1]);
    /// ```
    pub fn positions<F>(&self, predicate: F) -> BTreeSet<usize>
    where
        F: Fn(&Value) -> bool,
    {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| predicate(v))
            .map(|(i, _)| i)
            .collect()
    }

    /// Returns the positions of non-null cells that satisfy `predicate`.
    ///
    /// Constraint checks use this so that nulls, which are reported
    /// separately, are never flagged twice.
    pub fn present_positions<F>(&self, predicate: F) -> BTreeSet<usize>
    where
        F: Fn(&Value) -> bool,
    {
        self.positions(|v| !v.is_null() && predicate(v))
    }

    /// Returns a new column with `f` applied to every cell.
    pub fn map<F>(&self, f: F) -> Column
    where
        F: Fn(&Value) -> Value,
    {
        Column::new(self.values.iter().map(f).collect())
    }
}

impl From<Vec<Value>> for Column {
    fn from(values: Vec<Value>) -> Self {
        Column::new(values)
    }
}

impl<T: Into<Value>> FromIterator<T> for Column {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Column::new(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a Column {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
