//! JSON Schema export.
//!
//! Fields describe the cell they accept after coercion; a
//! [`TableSchema`](crate::TableSchema) describes one record of the table.

use serde_json::Value;

/// Trait for converting schema types to JSON Schema format.
///
/// Implementers of this trait can be exported as JSON Schema documents
/// compatible with draft 2020-12.
pub trait ToJsonSchema {
    /// Converts this schema to a JSON Schema representation.
    fn to_json_schema(&self) -> Value;
}

/// Maps a strftime format to a JSON Schema `format` keyword, if one matches.
pub fn strftime_to_json_schema_format(format: &str) -> Option<&'static str> {
    match format {
        "%Y-%m-%d" => Some("date"),
        "%Y-%m-%dT%H:%M:%S" | "%Y-%m-%dT%H:%M:%S%.f" => Some("date-time"),
        "%H:%M:%S" => Some("time"),
        _ => None,
    }
}
