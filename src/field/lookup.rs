//! External identifier lookups.
//!
//! Fields declared with `exists_in` check every distinct non-null value
//! against an [`IdentifierLookup`] in one bulk call per column.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Reason, Violation};
use crate::table::{Column, Value};

use super::traits::flagged;

/// A source of known identifiers, typically backed by a datastore.
///
/// Implementations are shared between schemas and concurrent validation runs
/// and must not depend on per-run state.
pub trait IdentifierLookup: Send + Sync {
    /// Returns, for each candidate, whether it exists.
    ///
    /// Candidates are distinct and non-null. A shorter result treats the
    /// remaining candidates as existing.
    fn exists(&self, candidates: &[Value]) -> Vec<bool>;
}

/// An in-memory [`IdentifierLookup`] over a fixed set of values.
///
/// # Example
///
/// ```rust
/// use tablecheck::{IdentifierLookup, KnownIdentifiers, Value};
///
/// let known = KnownIdentifiers::new([Value::Int(1), Value::Int(2)]);
/// assert_eq!(known.exists(&[Value::Int(2), Value::Int(7)]), vec![true, false]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct KnownIdentifiers {
    keys: HashSet<String>,
}

impl KnownIdentifiers {
    /// Creates a lookup containing `values`.
    pub fn new(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            keys: values.into_iter().map(|v| v.hash_key()).collect(),
        }
    }

    /// Returns the number of known identifiers.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if no identifiers are known.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl IdentifierLookup for KnownIdentifiers {
    fn exists(&self, candidates: &[Value]) -> Vec<bool> {
        candidates
            .iter()
            .map(|v| self.keys.contains(&v.hash_key()))
            .collect()
    }
}

/// Reports every row whose value the lookup does not know.
pub(crate) fn check_exists(
    lookup: &Arc<dyn IdentifierLookup>,
    column: &Column,
    message: Option<&String>,
) -> Option<Violation> {
    let mut rows_by_key: IndexMap<String, (Value, Vec<usize>)> = IndexMap::new();
    for (i, value) in column.iter().enumerate().filter(|(_, v)| !v.is_null()) {
        rows_by_key
            .entry(value.hash_key())
            .or_insert_with(|| (value.clone(), Vec::new()))
            .1
            .push(i);
    }
    if rows_by_key.is_empty() {
        return None;
    }

    let candidates: Vec<Value> = rows_by_key.values().map(|(v, _)| v.clone()).collect();
    let found = lookup.exists(&candidates);

    let missing: BTreeSet<usize> = rows_by_key
        .values()
        .zip(found)
        .filter(|(_, exists)| !exists)
        .flat_map(|((_, rows), _)| rows.iter().copied())
        .collect();

    flagged(Reason::IdentifierNotFound, missing).map(|v| v.with_message_opt(message))
}
