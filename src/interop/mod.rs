//! Interoperability with other schema formats.
//!
//! This module describes table schemas in industry-standard formats such as
//! JSON Schema, so a declared schema can double as documentation.

pub mod json_schema;

pub use json_schema::ToJsonSchema;
