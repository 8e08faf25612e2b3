//! Batched validation error events.
//!
//! This module provides [`Violation`] for failures produced by a single check,
//! [`ErrorEvent`] for a violation attributed to a field, and
//! [`ValidationErrors`] for the non-empty batch one validation run produces.

use std::collections::BTreeSet;
use std::fmt::{self, Display};

use indexmap::IndexMap;
use stillwater::prelude::*;

use super::reason::Reason;

/// Reserved field key for table-level errors.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Reason-specific parameters carried by an error (`limit_value`,
/// `unique_together_fields`, ...).
///
/// Equality ignores insertion order.
pub type Params = IndexMap<String, serde_json::Value>;

/// One failure of one check, batched over every affected row.
///
/// A violation does not know which field it belongs to; the schema attaches
/// that when it turns the violation into an [`ErrorEvent`].
///
/// # Example
///
/// ```rust
/// use tablecheck::{Reason, Violation};
/// use serde_json::json;
///
/// let violation = Violation::new(Reason::MaxLengthValue, [3])
///     .with_param("limit_value", json!(9));
///
/// assert_eq!(violation.indexes.len(), 1);
/// assert_eq!(
///     violation.message,
///     "Ensure this field has no more than 9 characters."
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Why the rows failed.
    pub reason: Reason,
    /// Row positions that failed this way. Empty for table-wide failures.
    pub indexes: BTreeSet<usize>,
    /// Reason-specific parameters.
    pub params: Params,
    /// Human-readable message.
    pub message: String,
    custom_message: bool,
}

impl Violation {
    /// Creates a violation with the reason's default message.
    pub fn new(reason: Reason, indexes: impl IntoIterator<Item = usize>) -> Self {
        let params = Params::new();
        Self {
            reason,
            indexes: indexes.into_iter().collect(),
            message: reason.default_message(&params),
            params,
            custom_message: false,
        }
    }

    /// Creates a violation that applies to the whole table, not to rows.
    pub fn table_wide(reason: Reason) -> Self {
        Self::new(reason, std::iter::empty())
    }

    /// Adds a parameter and returns self for chaining.
    ///
    /// The default message is re-rendered so it reflects the parameter,
    /// unless a custom message was set.
    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.params.insert(key.into(), value);
        if !self.custom_message {
            self.message = self.reason.default_message(&self.params);
        }
        self
    }

    /// Sets a custom message and returns self for chaining.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self.custom_message = true;
        self
    }

    /// Sets the message if `message` is `Some`.
    pub(crate) fn with_message_opt(self, message: Option<&String>) -> Self {
        match message {
            Some(m) => self.with_message(m.clone()),
            None => self,
        }
    }

    /// Attributes this violation to `field`.
    pub fn into_event(self, field: impl Into<String>) -> ErrorEvent {
        ErrorEvent {
            field: field.into(),
            reason: self.reason,
            indexes: self.indexes,
            params: self.params,
            message: self.message,
        }
    }
}

/// A batched validation failure attributed to a field or to the table.
///
/// Table-level failures use the reserved field key [`NON_FIELD_ERRORS`].
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEvent {
    /// Field name, or `non_field_errors`.
    pub field: String,
    /// Why the rows failed.
    pub reason: Reason,
    /// Affected row positions.
    pub indexes: BTreeSet<usize>,
    /// Reason-specific parameters.
    pub params: Params,
    /// Human-readable message.
    pub message: String,
}

impl ErrorEvent {
    /// Returns true for table-level events.
    pub fn is_non_field(&self) -> bool {
        self.field == NON_FIELD_ERRORS
    }
}

impl Display for ErrorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.field, self.message, self.reason)?;
        if !self.indexes.is_empty() {
            let rows: Vec<String> = self.indexes.iter().map(|i| i.to_string()).collect();
            write!(f, " (rows: {})", rows.join(", "))?;
        }
        Ok(())
    }
}

/// The non-empty batch of error events from one validation run.
///
/// `ValidationErrors` wraps a `NonEmptyVec<ErrorEvent>` so it can be the
/// failure side of a `Validation`. Events are kept in the order they were
/// raised: fields in declaration order, then table-level validators.
///
/// Both error views are derived from this batch; see
/// [`ValidationErrors::raw`] and [`ValidationErrors::human`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(NonEmptyVec<ErrorEvent>);

impl ValidationErrors {
    /// Creates a batch containing a single event.
    pub fn single(event: ErrorEvent) -> Self {
        Self(NonEmptyVec::singleton(event))
    }

    /// Creates a batch from a vec of events.
    ///
    /// # Panics
    ///
    /// Panics if the provided vec is empty.
    pub fn from_vec(events: Vec<ErrorEvent>) -> Self {
        Self(NonEmptyVec::from_vec(events).expect("ValidationErrors requires at least one event"))
    }

    /// Returns the number of events.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the batch is non-empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the events.
    pub fn iter(&self) -> impl Iterator<Item = &ErrorEvent> {
        self.0.iter()
    }

    /// Returns the first event.
    pub fn first(&self) -> &ErrorEvent {
        self.0.head()
    }

    /// Returns all events for `field`.
    pub fn for_field(&self, field: &str) -> Vec<&ErrorEvent> {
        self.0.iter().filter(|e| e.field == field).collect()
    }

    /// Returns all events with `reason`.
    pub fn with_reason(&self, reason: Reason) -> Vec<&ErrorEvent> {
        self.0.iter().filter(|e| e.reason == reason).collect()
    }

    /// Returns all table-level events.
    pub fn non_field(&self) -> Vec<&ErrorEvent> {
        self.for_field(NON_FIELD_ERRORS)
    }

    /// Converts the batch into a `Vec<ErrorEvent>`.
    pub fn into_vec(self) -> Vec<ErrorEvent> {
        self.0.into_vec()
    }
}

impl Semigroup for ValidationErrors {
    fn combine(self, other: Self) -> Self {
        ValidationErrors(self.0.combine(other.0))
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} error(s):", self.len())?;
        for (i, event) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, event)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ErrorEvent;
    type IntoIter = std::vec::IntoIter<ErrorEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationErrors>();
    assert_sync::<ValidationErrors>();
};
