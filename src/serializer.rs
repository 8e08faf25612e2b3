//! One validation run over one input table.

use thiserror::Error;
use tracing::debug;

use crate::error::ValidationErrors;
use crate::persist::{Persister, SaveError, TargetDescriptor};
use crate::report::{HumanErrors, RawErrors};
use crate::schema::TableSchema;
use crate::table::Table;

/// Misuse of a [`Serializer`]'s read accessors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializerError {
    /// Results were read before `validate` was called.
    #[error("call validate() before reading results")]
    NotValidated,

    /// Validated data was read after validation failed.
    #[error("data is invalid ({0} error event(s))")]
    Invalid(usize),
}

/// Binds a schema to one input table and exposes the run's results.
///
/// Results are only readable after [`validate`](Self::validate). Calling it
/// again discards the previous results and produces identical ones, since the
/// input never changes.
///
/// # Example
///
/// ```rust
/// use tablecheck::{Field, Reason, Serializer, Table, TableSchema, Value};
///
/// let schema = TableSchema::builder()
///     .field("id", Field::integer())
///     .build()
///     .unwrap();
/// let table = Table::new()
///     .with_column("id", vec![Value::from("1"), Value::Null])
///     .unwrap();
///
/// let mut serializer = Serializer::new(&schema, table);
/// assert!(!serializer.validate());
///
/// let human = serializer.human_errors().unwrap();
/// let nulls = human.find("id", Reason::NullNotAllowed).unwrap();
/// assert_eq!(nulls.indexes, vec![1]);
/// assert!(serializer.validated_data().is_err());
/// ```
#[derive(Debug)]
pub struct Serializer<'a> {
    schema: &'a TableSchema,
    data: Table,
    outcome: Option<Result<Table, ValidationErrors>>,
}

impl<'a> Serializer<'a> {
    /// Creates a serializer for `data`. Nothing is checked yet.
    pub fn new(schema: &'a TableSchema, data: Table) -> Self {
        Self {
            schema,
            data,
            outcome: None,
        }
    }

    /// Returns the schema.
    pub fn schema(&self) -> &TableSchema {
        self.schema
    }

    /// Returns the input table.
    pub fn data(&self) -> &Table {
        &self.data
    }

    /// Runs the pipeline and returns true if no error was recorded.
    pub fn validate(&mut self) -> bool {
        let outcome = self.schema.validate(&self.data).into_result();
        let valid = outcome.is_ok();
        self.outcome = Some(outcome);
        valid
    }

    /// Returns true if `validate` has been called.
    pub fn is_validated(&self) -> bool {
        self.outcome.is_some()
    }

    /// Returns the recorded error events, if validation failed.
    ///
    /// # Errors
    ///
    /// Returns `SerializerError::NotValidated` before `validate`.
    pub fn error_events(&self) -> Result<Option<&ValidationErrors>, SerializerError> {
        match &self.outcome {
            None => Err(SerializerError::NotValidated),
            Some(Ok(_)) => Ok(None),
            Some(Err(errors)) => Ok(Some(errors)),
        }
    }

    /// Returns the raw error view; empty when validation succeeded.
    ///
    /// # Errors
    ///
    /// Returns `SerializerError::NotValidated` before `validate`.
    pub fn errors(&self) -> Result<RawErrors, SerializerError> {
        Ok(self
            .error_events()?
            .map(ValidationErrors::raw)
            .unwrap_or_default())
    }

    /// Returns the grouped error view; empty when validation succeeded.
    ///
    /// # Errors
    ///
    /// Returns `SerializerError::NotValidated` before `validate`.
    pub fn human_errors(&self) -> Result<HumanErrors, SerializerError> {
        Ok(self
            .error_events()?
            .map(ValidationErrors::human)
            .unwrap_or_default())
    }

    /// Returns the coerced table: declared fields only, under their field
    /// names, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns `SerializerError::NotValidated` before `validate`, or
    /// `SerializerError::Invalid` if validation failed.
    pub fn validated_data(&self) -> Result<&Table, SerializerError> {
        match &self.outcome {
            None => Err(SerializerError::NotValidated),
            Some(Ok(table)) => Ok(table),
            Some(Err(errors)) => Err(SerializerError::Invalid(errors.len())),
        }
    }

    /// Saves the validated table to the schema's target.
    ///
    /// # Errors
    ///
    /// Returns `SaveError::NotValidated` or `SaveError::Invalid` without
    /// calling the persister, `SaveError::NoTarget` if the schema has no
    /// target, or `SaveError::Persist` with the persister's own error.
    pub fn save<P: Persister>(&self, persister: &P) -> Result<P::Output, SaveError<P::Error>> {
        let table = self.table_to_save()?;
        let target = self.schema.target().ok_or(SaveError::NoTarget)?;
        Self::persist(persister, table, target)
    }

    /// Saves the validated table to an explicit target.
    ///
    /// # Errors
    ///
    /// As [`save`](Self::save), except that no schema target is needed.
    pub fn save_to<P: Persister>(
        &self,
        persister: &P,
        target: &TargetDescriptor,
    ) -> Result<P::Output, SaveError<P::Error>> {
        let table = self.table_to_save()?;
        Self::persist(persister, table, target)
    }

    fn table_to_save<E>(&self) -> Result<&Table, SaveError<E>> {
        match &self.outcome {
            None => Err(SaveError::NotValidated),
            Some(Err(errors)) => Err(SaveError::Invalid(errors.clone())),
            Some(Ok(table)) => Ok(table),
        }
    }

    fn persist<P: Persister>(
        persister: &P,
        table: &Table,
        target: &TargetDescriptor,
    ) -> Result<P::Output, SaveError<P::Error>> {
        debug!(target_name = target.name(), rows = table.n_rows(), "persisting table");
        persister.persist(table, target).map_err(SaveError::Persist)
    }

    /// Validates, then saves only if validation succeeded.
    ///
    /// # Errors
    ///
    /// Returns `SaveError::Invalid` with every error event if validation
    /// fails; otherwise as [`save`](Self::save).
    pub fn validate_and_save<P: Persister>(
        &mut self,
        persister: &P,
    ) -> Result<P::Output, SaveError<P::Error>> {
        self.validate();
        self.save(persister)
    }

    /// Consumes the serializer and returns the validated table.
    ///
    /// # Errors
    ///
    /// As [`validated_data`](Self::validated_data).
    pub fn into_validated_data(self) -> Result<Table, SerializerError> {
        match self.outcome {
            None => Err(SerializerError::NotValidated),
            Some(Ok(table)) => Ok(table),
            Some(Err(errors)) => Err(SerializerError::Invalid(errors.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::table::Value;

    fn schema() -> TableSchema {
        TableSchema::builder()
            .field("id", Field::integer())
            .build()
            .unwrap()
    }

    #[test]
    fn test_results_need_validate() {
        let schema = schema();
        let serializer = Serializer::new(&schema, Table::new());
        assert_eq!(serializer.errors().unwrap_err(), SerializerError::NotValidated);
        assert_eq!(
            serializer.human_errors().unwrap_err(),
            SerializerError::NotValidated
        );
        assert_eq!(
            serializer.validated_data().unwrap_err(),
            SerializerError::NotValidated
        );
    }

    #[test]
    fn test_success_has_empty_views() {
        let schema = schema();
        let table = Table::new().with_column("id", vec![Value::Int(1)]).unwrap();
        let mut serializer = Serializer::new(&schema, table);
        assert!(serializer.validate());
        assert!(serializer.errors().unwrap().is_empty());
        assert!(serializer.human_errors().unwrap().is_empty());
        assert_eq!(serializer.validated_data().unwrap().n_rows(), 1);
    }

    #[test]
    fn test_invalid_data_is_not_exposed() {
        let schema = schema();
        let table = Table::new().with_column("id", vec![Value::Null]).unwrap();
        let mut serializer = Serializer::new(&schema, table);
        assert!(!serializer.validate());
        assert_eq!(
            serializer.validated_data().unwrap_err(),
            SerializerError::Invalid(1)
        );
    }
}
