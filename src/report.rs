//! Error reports.
//!
//! Two views are derived from the same [`ValidationErrors`] batch:
//!
//! - [`RawErrors`]: field to distinct `(message, code)` pairs, for compact
//!   display.
//! - [`HumanErrors`]: field to entries grouped by reason and parameters, each
//!   carrying the sorted union of affected row positions, for remediation.
//!
//! Both keep fields in the order their first error was raised, so
//! `non_field_errors` comes last.
//!
//! # Example
//!
//! ```rust
//! use tablecheck::{Field, Table, TableSchema, Value};
//! use serde_json::json;
//!
//! let schema = TableSchema::builder()
//!     .field("name", Field::text().max_len(3))
//!     .build()
//!     .unwrap();
//! let table = Table::new()
//!     .with_column("name", vec![Value::from("abcd"), Value::from("ok"), Value::from("wxyz")])
//!     .unwrap();
//!
//! let errors = schema.validate(&table).into_result().unwrap_err();
//! assert_eq!(
//!     errors.human().to_json(),
//!     json!({"name": [{"reason": "MAX_LENGTH_VALUE", "indexes": [0, 2], "limit_value": 3}]})
//! );
//! assert_eq!(errors.raw().get("name").unwrap().len(), 1);
//! ```

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde_json::{json, Value as Json};

use crate::error::{ErrorEvent, Params, Reason, ValidationErrors};

/// One entry of the raw view: what went wrong, in words and as a code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorDetail {
    /// Human-readable message.
    pub message: String,
    /// Machine-readable reason.
    pub code: Reason,
}

impl ErrorDetail {
    fn to_json(&self) -> Json {
        json!({"message": self.message, "code": self.code.code()})
    }
}

/// Field to distinct error details, without row positions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawErrors {
    fields: IndexMap<String, Vec<ErrorDetail>>,
}

impl RawErrors {
    /// Builds the raw view from error events.
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a ErrorEvent>) -> Self {
        let mut fields: IndexMap<String, Vec<ErrorDetail>> = IndexMap::new();
        for event in events {
            let detail = ErrorDetail {
                message: event.message.clone(),
                code: event.reason,
            };
            let details = fields.entry(event.field.clone()).or_default();
            if !details.contains(&detail) {
                details.push(detail);
            }
        }
        Self { fields }
    }

    /// Returns the details recorded for a field.
    pub fn get(&self, field: &str) -> Option<&[ErrorDetail]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Returns the fields with errors, in first-raised order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Returns `(field, details)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ErrorDetail])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Returns the number of fields with errors.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field has errors.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Renders `{field: [{"message", "code"}, ...]}`.
    pub fn to_json(&self) -> Json {
        let map: serde_json::Map<String, Json> = self
            .fields
            .iter()
            .map(|(field, details)| {
                let details = details.iter().map(ErrorDetail::to_json).collect();
                (field.clone(), Json::Array(details))
            })
            .collect();
        Json::Object(map)
    }
}

/// Errors of one field sharing a reason and parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedError {
    /// Why the rows failed.
    pub reason: Reason,
    /// Sorted, distinct row positions.
    pub indexes: Vec<usize>,
    /// Reason-specific parameters.
    pub params: Params,
}

impl GroupedError {
    /// Renders `{"reason", "indexes", ...params}`.
    pub fn to_json(&self) -> Json {
        let mut map = serde_json::Map::new();
        map.insert("reason".to_string(), json!(self.reason.code()));
        map.insert("indexes".to_string(), json!(self.indexes));
        for (key, value) in &self.params {
            map.insert(key.clone(), value.clone());
        }
        Json::Object(map)
    }
}

/// Field to grouped, row-indexed errors.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HumanErrors {
    fields: IndexMap<String, Vec<GroupedError>>,
}

impl HumanErrors {
    /// Builds the grouped view from error events.
    ///
    /// Events of one field with the same reason and equal parameters merge
    /// into one entry. Entries keep the order their first event was raised.
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a ErrorEvent>) -> Self {
        let mut grouped: IndexMap<String, Vec<(Reason, Params, BTreeSet<usize>)>> = IndexMap::new();
        for event in events {
            let groups = grouped.entry(event.field.clone()).or_default();
            match groups
                .iter_mut()
                .find(|(reason, params, _)| *reason == event.reason && *params == event.params)
            {
                Some((_, _, indexes)) => indexes.extend(event.indexes.iter().copied()),
                None => groups.push((event.reason, event.params.clone(), event.indexes.clone())),
            }
        }

        let fields = grouped
            .into_iter()
            .map(|(field, groups)| {
                let groups = groups
                    .into_iter()
                    .map(|(reason, params, indexes)| GroupedError {
                        reason,
                        indexes: indexes.into_iter().collect(),
                        params,
                    })
                    .collect();
                (field, groups)
            })
            .collect();
        Self { fields }
    }

    /// Returns the grouped entries of a field.
    pub fn get(&self, field: &str) -> Option<&[GroupedError]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Returns the first entry of a field with this reason.
    pub fn find(&self, field: &str, reason: Reason) -> Option<&GroupedError> {
        self.get(field)?.iter().find(|g| g.reason == reason)
    }

    /// Returns the fields with errors, in first-raised order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Returns `(field, entries)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[GroupedError])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Returns the number of fields with errors.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field has errors.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Renders `{field: [{"reason", "indexes", ...params}, ...]}`.
    pub fn to_json(&self) -> Json {
        let map: serde_json::Map<String, Json> = self
            .fields
            .iter()
            .map(|(field, groups)| {
                let groups = groups.iter().map(GroupedError::to_json).collect();
                (field.clone(), Json::Array(groups))
            })
            .collect();
        Json::Object(map)
    }
}

impl ValidationErrors {
    /// Returns the raw view: distinct messages and codes per field.
    pub fn raw(&self) -> RawErrors {
        RawErrors::from_events(self.iter())
    }

    /// Returns the grouped, row-indexed view.
    pub fn human(&self) -> HumanErrors {
        HumanErrors::from_events(self.iter())
    }
}
