//! Tests for sharing schemas and validators across threads.

use std::sync::Arc;
use std::thread;

use tablecheck::{
    Field, Reason, SchemaRegistry, Serializer, Table, TableSchema, TableValidator,
    UniqueTogetherValidator, Value,
};

fn product_schema() -> TableSchema {
    TableSchema::builder()
        .field("id", Field::integer())
        .field("name", Field::text().max_len(9))
        .unique_together(["id", "name"])
        .build()
        .unwrap()
}

fn table_for(i: i64) -> Table {
    Table::from_rows(
        &["id", "name"],
        vec![
            vec![Value::from(i.to_string()), Value::from(format!("P{i}"))],
            vec![Value::from(i.to_string()), Value::from(format!("P{i}"))],
        ],
    )
    .unwrap()
}

#[test]
fn test_concurrent_validation_on_shared_schema() {
    let schema = Arc::new(product_schema());

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let schema = Arc::clone(&schema);
            thread::spawn(move || {
                let mut serializer = Serializer::new(&schema, table_for(i));
                assert!(!serializer.validate());
                let human = serializer.human_errors().unwrap();
                let duplicate = human
                    .find("non_field_errors", Reason::NonUniqueTogether)
                    .unwrap();
                assert_eq!(duplicate.indexes, vec![1]);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_registry_access() {
    let registry = Arc::new(SchemaRegistry::new());
    registry.register("product", product_schema()).unwrap();

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                if i % 2 == 0 {
                    // Even threads validate
                    let result = registry.validate("product", &table_for(i)).unwrap();
                    assert!(result.is_failure());
                } else {
                    // Odd threads register their own schema
                    registry
                        .register(format!("product_{i}"), product_schema())
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(registry.len(), 11);
}

#[test]
fn test_shared_validator_instance() {
    let shared: Arc<dyn TableValidator> = Arc::new(UniqueTogetherValidator::new(["id"]));

    let schemas: Vec<Arc<TableSchema>> = (0..4)
        .map(|_| {
            Arc::new(
                TableSchema::builder()
                    .field("id", Field::integer())
                    .shared_validator(Arc::clone(&shared))
                    .build()
                    .unwrap(),
            )
        })
        .collect();

    let handles: Vec<_> = schemas
        .into_iter()
        .enumerate()
        .map(|(i, schema)| {
            thread::spawn(move || {
                let table = Table::new()
                    .with_column("id", vec![Value::Int(i as i64), Value::Int(i as i64 + 1)])
                    .unwrap();
                assert!(schema.validate(&table).is_success());
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
