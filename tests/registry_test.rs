//! Tests for schema registry operations.

use serde_json::json;
use tablecheck::{Field, Reason, RegistryError, SchemaRegistry, Table, TableSchema, Value};

fn product_schema() -> TableSchema {
    TableSchema::builder()
        .field("id", Field::integer())
        .field("name", Field::text().max_len(9))
        .unique_together(["id", "name"])
        .build()
        .unwrap()
}

fn products(rows: Vec<(&str, &str)>) -> Table {
    Table::from_rows(
        &["id", "name"],
        rows.into_iter()
            .map(|(id, name)| vec![Value::from(id), Value::from(name)])
            .collect(),
    )
    .unwrap()
}

#[test]
fn test_register_and_get() {
    let registry = SchemaRegistry::new();

    registry.register("product", product_schema()).unwrap();

    assert!(registry.get("product").is_some());
    assert!(registry.get("missing").is_none());
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_duplicate_registration_fails() {
    let registry = SchemaRegistry::new();

    registry.register("product", product_schema()).unwrap();

    let result = registry.register("product", product_schema());
    assert!(matches!(result, Err(RegistryError::DuplicateName(name)) if name == "product"));
}

#[test]
fn test_validate_with_registry() {
    let registry = SchemaRegistry::new();
    registry.register("product", product_schema()).unwrap();

    let valid = registry
        .validate("product", &products(vec![("1", "Tea"), ("2", "Coffee")]))
        .unwrap();
    assert!(valid.is_success());

    let invalid = registry
        .validate("product", &products(vec![("1", "Tea"), ("1", "Tea")]))
        .unwrap();
    let errors = invalid.into_result().unwrap_err();
    assert_eq!(errors.first().reason, Reason::NonUniqueTogether);
}

#[test]
fn test_validate_unknown_schema() {
    let registry = SchemaRegistry::new();
    let result = registry.validate("product", &products(vec![]));
    assert_eq!(
        result.unwrap_err(),
        RegistryError::SchemaNotFound("product".to_string())
    );
}

#[test]
fn test_batch_keeps_job_order() {
    let registry = SchemaRegistry::new();
    registry.register("product", product_schema()).unwrap();

    let tables: Vec<Table> = (0..32)
        .map(|i| {
            if i % 4 == 0 {
                products(vec![("1", "Tea"), ("1", "Tea")])
            } else {
                products(vec![("1", "Tea"), ("2", "Tea")])
            }
        })
        .collect();
    let jobs: Vec<(&str, &Table)> = tables.iter().map(|t| ("product", t)).collect();

    let results = registry.validate_batch(&jobs);
    assert_eq!(results.len(), 32);
    for (i, result) in results.iter().enumerate() {
        let result = result.as_ref().unwrap();
        assert_eq!(result.is_failure(), i % 4 == 0, "job {i}");
    }
}

#[test]
fn test_batch_unknown_name_fails_only_its_job() {
    let registry = SchemaRegistry::new();
    registry.register("product", product_schema()).unwrap();

    let table = products(vec![("1", "Tea")]);
    let results = registry.validate_batch(&[("product", &table), ("order", &table)]);

    assert!(results[0].is_ok());
    assert_eq!(
        results[1].as_ref().unwrap_err(),
        &RegistryError::SchemaNotFound("order".to_string())
    );
}

#[test]
fn test_json_schema_export() {
    let registry = SchemaRegistry::new();
    registry.register("product", product_schema()).unwrap();

    let doc = registry.to_json_schema();
    assert_eq!(doc["$schema"], "https://json-schema.org/draft/2020-12/schema");
    assert_eq!(
        doc["$defs"]["product"]["properties"]["name"],
        json!({"type": "string", "minLength": 1, "maxLength": 9})
    );
}
