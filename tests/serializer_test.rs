use std::cell::RefCell;

use serde_json::json;
use tablecheck::{
    Field, Persister, Reason, SaveError, Serializer, SerializerError, Table, TableSchema,
    TargetDescriptor, Value,
};

fn product_schema() -> TableSchema {
    TableSchema::builder()
        .field("id", Field::integer())
        .field("name", Field::text().max_len(9))
        .unique_together(["id", "name"])
        .target(TargetDescriptor::new("products").with_option("conflict", json!("upsert")))
        .build()
        .unwrap()
}

fn worked_example() -> Table {
    Table::from_rows(
        &["id", "name"],
        vec![
            vec![Value::from("234556"), Value::from("Coca-Cola")],
            vec![Value::from("234556"), Value::from("Coca-Cola")],
            vec![Value::from("234556"), Value::Null],
            vec![Value::Null, Value::from("0123456789")],
        ],
    )
    .unwrap()
}

#[derive(Default)]
struct RecordingPersister {
    calls: RefCell<Vec<(String, usize)>>,
}

impl Persister for RecordingPersister {
    type Output = usize;
    type Error = String;

    fn persist(&self, table: &Table, target: &TargetDescriptor) -> Result<usize, String> {
        self.calls
            .borrow_mut()
            .push((target.name().to_string(), table.n_rows()));
        Ok(table.n_rows())
    }
}

struct FailingPersister;

impl Persister for FailingPersister {
    type Output = ();
    type Error = String;

    fn persist(&self, _table: &Table, _target: &TargetDescriptor) -> Result<(), String> {
        Err("connection refused".to_string())
    }
}

#[test]
fn test_worked_example_human_view() {
    let schema = product_schema();
    let mut serializer = Serializer::new(&schema, worked_example());
    assert!(!serializer.validate());

    let human = serializer.human_errors().unwrap();
    assert_eq!(
        human.to_json(),
        json!({
            "id": [
                {"reason": "NULL_NOT_ALLOWED", "indexes": [3]}
            ],
            "name": [
                {"reason": "NULL_NOT_ALLOWED", "indexes": [2]},
                {"reason": "MAX_LENGTH_VALUE", "indexes": [3], "limit_value": 9}
            ],
            "non_field_errors": [
                {
                    "reason": "NON_UNIQUE_TOGETHER",
                    "indexes": [1],
                    "unique_together_fields": ["id", "name"]
                }
            ]
        })
    );
}

#[test]
fn test_worked_example_raw_view() {
    let schema = product_schema();
    let mut serializer = Serializer::new(&schema, worked_example());
    serializer.validate();

    let raw = serializer.errors().unwrap();
    assert_eq!(
        raw.fields().collect::<Vec<_>>(),
        vec!["id", "name", "non_field_errors"]
    );

    let name = raw.get("name").unwrap();
    assert_eq!(name.len(), 2);
    assert_eq!(name[0].code, Reason::NullNotAllowed);
    assert_eq!(name[1].code, Reason::MaxLengthValue);
    assert_eq!(
        name[1].message,
        "Ensure this field has no more than 9 characters."
    );

    assert_eq!(
        raw.to_json()["non_field_errors"][0],
        json!({
            "message": "The fields id, name must make a unique set.",
            "code": "NON_UNIQUE_TOGETHER"
        })
    );
}

#[test]
fn test_validate_is_idempotent() {
    let schema = product_schema();
    let mut serializer = Serializer::new(&schema, worked_example());

    serializer.validate();
    let first_raw = serializer.errors().unwrap();
    let first_human = serializer.human_errors().unwrap();

    serializer.validate();
    assert_eq!(serializer.errors().unwrap(), first_raw);
    assert_eq!(serializer.human_errors().unwrap(), first_human);
}

#[test]
fn test_validated_data_renamed_and_ordered() {
    let schema = TableSchema::builder()
        .field("name", Field::text())
        .source("Product Name")
        .field("id", Field::integer())
        .source("Product ID")
        .build()
        .unwrap();
    let table = Table::from_records(&json!([
        {"Product ID": "1", "Product Name": "Tea", "Warehouse": "B"},
        {"Product ID": 2, "Product Name": "Coffee", "Warehouse": "C"}
    ]))
    .unwrap();

    let mut serializer = schema.serializer(table);
    assert!(serializer.validate());

    let data = serializer.validated_data().unwrap();
    assert_eq!(data.column_names().collect::<Vec<_>>(), vec!["name", "id"]);
    assert_eq!(
        data.to_records(),
        json!([
            {"name": "Tea", "id": 1},
            {"name": "Coffee", "id": 2}
        ])
    );
}

#[test]
fn test_save_requires_validation() {
    let schema = product_schema();
    let serializer = Serializer::new(&schema, worked_example());
    let persister = RecordingPersister::default();

    assert!(matches!(
        serializer.save(&persister),
        Err(SaveError::NotValidated)
    ));
    assert!(persister.calls.borrow().is_empty());
}

#[test]
fn test_validate_and_save_skips_invalid_data() {
    let schema = product_schema();
    let mut serializer = Serializer::new(&schema, worked_example());
    let persister = RecordingPersister::default();

    match serializer.validate_and_save(&persister) {
        Err(SaveError::Invalid(errors)) => assert_eq!(errors.len(), 4),
        other => panic!("expected invalid data, got {other:?}"),
    }
    assert!(persister.calls.borrow().is_empty());
}

#[test]
fn test_validate_and_save_persists_valid_data() {
    let schema = product_schema();
    let table = Table::from_rows(
        &["id", "name"],
        vec![
            vec![Value::from("1"), Value::from("Tea")],
            vec![Value::from("2"), Value::from("Coffee")],
        ],
    )
    .unwrap();
    let mut serializer = Serializer::new(&schema, table);
    let persister = RecordingPersister::default();

    assert_eq!(serializer.validate_and_save(&persister).unwrap(), 2);
    assert_eq!(
        persister.calls.borrow().as_slice(),
        &[("products".to_string(), 2)]
    );
}

#[test]
fn test_persist_error_is_wrapped() {
    let schema = product_schema();
    let table = Table::from_rows(&["id", "name"], vec![vec![Value::Int(1), Value::from("Tea")]])
        .unwrap();
    let mut serializer = Serializer::new(&schema, table);

    match serializer.validate_and_save(&FailingPersister) {
        Err(SaveError::Persist(message)) => assert_eq!(message, "connection refused"),
        other => panic!("expected persist error, got {other:?}"),
    }
}

#[test]
fn test_save_without_target() {
    let schema = TableSchema::builder()
        .field("id", Field::integer())
        .build()
        .unwrap();
    let table = Table::new().with_column("id", vec![Value::Int(1)]).unwrap();
    let mut serializer = Serializer::new(&schema, table);
    serializer.validate();

    let persister = RecordingPersister::default();
    assert!(matches!(serializer.save(&persister), Err(SaveError::NoTarget)));

    let target = TargetDescriptor::new("scratch");
    assert_eq!(serializer.save_to(&persister, &target).unwrap(), 1);
}

#[test]
fn test_invalid_data_without_target_reports_errors() {
    let schema = TableSchema::builder()
        .field("id", Field::integer())
        .build()
        .unwrap();
    let table = Table::new().with_column("id", vec![Value::Null]).unwrap();
    let persister = RecordingPersister::default();

    let unvalidated = Serializer::new(&schema, table.clone());
    assert!(matches!(
        unvalidated.save(&persister),
        Err(SaveError::NotValidated)
    ));

    let mut serializer = Serializer::new(&schema, table);
    match serializer.validate_and_save(&persister) {
        Err(SaveError::Invalid(errors)) => {
            assert_eq!(errors.first().reason, Reason::NullNotAllowed);
        }
        other => panic!("expected invalid data, got {other:?}"),
    }
    assert!(persister.calls.borrow().is_empty());
}

#[test]
fn test_into_validated_data() {
    let schema = product_schema();
    let mut serializer = Serializer::new(&schema, worked_example());
    serializer.validate();
    assert_eq!(
        serializer.into_validated_data().unwrap_err(),
        SerializerError::Invalid(4)
    );
}
