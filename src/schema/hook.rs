//! Per-field post-coercion hooks.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::error::{Reason, Violation};
use crate::table::Column;

/// A user function run on a field's coerced column.
///
/// The hook may return a replacement column, which is used by the
/// constraint checks and table-level validators that follow.
pub type FieldHook = Arc<dyn Fn(&Column) -> Result<Column, HookError> + Send + Sync>;

/// A hook's report that the column is unacceptable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HookError {
    /// The hook failed as a whole; recorded as `HOOK_FAILED`.
    #[error("{0}")]
    Failed(String),

    /// The hook flagged specific rows; each violation is recorded as given.
    #[error("hook rejected {} group(s) of rows", .0.len())]
    Rejected(Vec<Violation>),
}

impl HookError {
    /// Creates a whole-column failure.
    pub fn failed(message: impl Into<String>) -> Self {
        HookError::Failed(message.into())
    }
}

/// Runs `hook` with panics contained to this field.
///
/// On any failure the input column is kept so later checks still run.
pub(crate) fn run_hook(field: &str, hook: &FieldHook, column: Column) -> (Column, Vec<Violation>) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| hook(&column)));
    match outcome {
        Ok(Ok(replaced)) if replaced.len() == column.len() => (replaced, Vec::new()),
        Ok(Ok(replaced)) => {
            let message = format!(
                "hook returned {} rows, expected {}",
                replaced.len(),
                column.len()
            );
            warn!(field, %message, "discarding hook output");
            (column, vec![hook_failed(message)])
        }
        Ok(Err(HookError::Failed(message))) => {
            warn!(field, %message, "field hook failed");
            (column, vec![hook_failed(message)])
        }
        Ok(Err(HookError::Rejected(violations))) => {
            warn!(field, groups = violations.len(), "field hook rejected rows");
            (column, violations)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(field, %message, "field hook panicked");
            (column, vec![hook_failed(message)])
        }
    }
}

fn hook_failed(message: String) -> Violation {
    Violation::table_wide(Reason::HookFailed).with_message(message)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "hook panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn column() -> Column {
        Column::new(vec![Value::from("a"), Value::from("b")])
    }

    #[test]
    fn test_replacement_is_used() {
        let hook: FieldHook = Arc::new(|c: &Column| Ok(c.map(|v| Value::from(v.to_string().to_uppercase()))));
        let (out, violations) = run_hook("name", &hook, column());
        assert!(violations.is_empty());
        assert_eq!(out.get(0), Some(&Value::from("A")));
    }

    #[test]
    fn test_failed_keeps_input() {
        let hook: FieldHook = Arc::new(|_: &Column| Err(HookError::failed("lookup service down")));
        let (out, violations) = run_hook("name", &hook, column());
        assert_eq!(out, column());
        assert_eq!(violations[0].reason, Reason::HookFailed);
        assert_eq!(violations[0].message, "lookup service down");
    }

    #[test]
    fn test_rejected_rows_pass_through() {
        let hook: FieldHook = Arc::new(|_: &Column| {
            Err(HookError::Rejected(vec![
                Violation::new(Reason::InvalidChoice, [1]).with_message("not stocked")
            ]))
        });
        let (_, violations) = run_hook("name", &hook, column());
        assert_eq!(violations[0].reason, Reason::InvalidChoice);
        assert!(violations[0].indexes.contains(&1));
    }

    #[test]
    fn test_panic_is_contained() {
        let hook: FieldHook = Arc::new(|_: &Column| -> Result<Column, HookError> { panic!("boom") });
        let (out, violations) = run_hook("name", &hook, column());
        assert_eq!(out, column());
        assert_eq!(violations[0].message, "boom");
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        let hook: FieldHook = Arc::new(|_: &Column| Ok(Column::new(vec![Value::Null])));
        let (out, violations) = run_hook("name", &hook, column());
        assert_eq!(out.len(), 2);
        assert_eq!(violations[0].reason, Reason::HookFailed);
    }
}
