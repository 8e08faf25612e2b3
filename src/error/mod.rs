//! Error types.
//!
//! This module provides the closed set of [`Reason`] codes, the batched
//! [`ErrorEvent`] model used for expected validation failures, and
//! [`DefinitionError`] for malformed schema declarations.

mod definition;
mod event;
mod reason;

pub use definition::DefinitionError;
pub use event::{ErrorEvent, Params, ValidationErrors, Violation, NON_FIELD_ERRORS};
pub use reason::Reason;
