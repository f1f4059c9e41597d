//! Validates contract fixtures against frozen JSON schemas.

use jsonschema::JSONSchema;
use serde_json::Value;

fn load_json(path: &str) -> Value {
    let raw = std::fs::read_to_string(path).expect("json file should be readable");
    serde_json::from_str(&raw).expect("json file should be valid")
}

fn compile_validator(schema_path: &str) -> JSONSchema {
    let schema = load_json(schema_path);
    JSONSchema::compile(&schema).expect("schema should compile")
}

#[test]
fn summary_fixture_matches_schema() {
    let validator = compile_validator(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/summary-response.schema.json"
    ));
    let fixture = load_json(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/fixtures/summary-response.valid.json"
    ));
    assert!(
        validator.is_valid(&fixture),
        "summary fixture should validate against schema"
    );
}

#[test]
fn history_fixture_matches_schema() {
    let validator = compile_validator(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/history-response.schema.json"
    ));
    let fixture = load_json(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/fixtures/history-response.valid.json"
    ));
    assert!(
        validator.is_valid(&fixture),
        "history fixture should validate against schema"
    );
}

#[test]
fn negative_counts_are_rejected_by_summary_schema() {
    let validator = compile_validator(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/summary-response.schema.json"
    ));
    let fixture = serde_json::json!({
        "total_count": -1,
        "type_distribution": {}
    });
    assert!(!validator.is_valid(&fixture));
}
