//! Cell values.
//!
//! This module provides [`Value`], the dynamically typed cell stored in every
//! [`Column`](crate::Column). Raw input tables usually hold text and numbers;
//! coercion turns them into the typed variants a field declares.

use std::fmt::{self, Display};

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;

/// A single cell of a table.
///
/// `Value::Null` marks a missing cell. A `Float` holding NaN is treated as
/// null as well, so tables built from numeric sources with NaN holes behave
/// the same as tables with explicit nulls.
///
/// # Example
///
/// ```rust
/// use tablecheck::Value;
///
/// assert!(Value::Null.is_null());
/// assert!(Value::Float(f64::NAN).is_null());
/// assert!(!Value::from("Coca-Cola").is_null());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A missing value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit float.
    Float(f64),
    /// A UTF-8 string.
    Text(String),
    /// A calendar date.
    Date(NaiveDate),
    /// A date and time without timezone.
    DateTime(NaiveDateTime),
}

impl Value {
    /// Returns true for `Null` and for a NaN float.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Returns the string slice if this is a `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an `Int` value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the float for `Float` and `Int` values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Returns the boolean if this is a `Bool` value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the date if this is a `Date` value.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns a short name for the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
        }
    }

    /// Returns a key that is equal for equal values of the same type.
    ///
    /// Used for duplicate detection and identifier lookups, where cells need
    /// hashing but `f64` cannot be hashed directly. `-0.0` and `0.0` share a
    /// key.
    pub(crate) fn hash_key(&self) -> String {
        let value = match self {
            Value::Float(f) if *f == 0.0 => json!(0.0),
            other => other.to_json(),
        };
        let json = serde_json::to_string(&value).unwrap_or_else(|_| format!("{:?}", self));
        format!("{}:{}", self.type_name(), json)
    }

    /// Converts the value into its JSON representation.
    ///
    /// Dates and datetimes become ISO 8601 strings; NaN becomes `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            v if v.is_null() => serde_json::Value::Null,
            Value::Bool(b) => json!(b),
            Value::Int(n) => json!(n),
            Value::Float(f) => json!(f),
            Value::Text(s) => json!(s),
            Value::Date(d) => json!(d.format("%Y-%m-%d").to_string()),
            Value::DateTime(dt) => json!(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            Value::Null => serde_json::Value::Null,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            v if v.is_null() => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            Value::Null => write!(f, "null"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
