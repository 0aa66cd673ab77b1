// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn accepts_well_formed_configuration() {
    let schema = json!({
        "type": "object",
        "required": ["executor_config"],
        "properties": {
            "executor_config": {
                "type": "object",
                "required": ["retries"],
                "properties": { "retries": { "type": "integer", "minimum": 0, "maximum": 5 } }
            }
        }
    });
    let config = json!({ "executor_config": { "retries": 3 } });
    assert!(validate(&schema, &config).is_ok());
}

#[test]
fn reports_missing_required_property_with_dotted_path() {
    let schema = json!({ "type": "object", "required": ["executor_config"] });
    let config = json!({});
    let violation = validate(&schema, &config).unwrap_err();
    assert_eq!(violation.path, "$.executor_config");
}

#[test]
fn reports_first_violation_in_nested_properties() {
    let schema = json!({
        "type": "object",
        "properties": {
            "executor_config": {
                "type": "object",
                "properties": { "retries": { "type": "integer", "minimum": 0 } }
            }
        }
    });
    let config = json!({ "executor_config": { "retries": -1 } });
    let violation = validate(&schema, &config).unwrap_err();
    assert_eq!(violation.path, "$.executor_config.retries");
}

#[test]
fn enforces_enum_membership() {
    let schema = json!({ "enum": ["shell", "http", "noop"] });
    assert!(validate(&schema, &json!("shell")).is_ok());
    assert!(validate(&schema, &json!("ftp")).is_err());
}

#[test]
fn enforces_regex_pattern() {
    let schema = json!({ "pattern": "^[a-z]+$" });
    assert!(validate(&schema, &json!("abc")).is_ok());
    assert!(validate(&schema, &json!("ABC")).is_err());
}

#[test]
fn validates_array_items() {
    let schema = json!({ "type": "array", "items": { "type": "integer", "minimum": 0 } });
    assert!(validate(&schema, &json!([1, 2, 3])).is_ok());
    let violation = validate(&schema, &json!([1, -2, 3])).unwrap_err();
    assert_eq!(violation.path, "$[1]");
}

#[test]
fn validate_configuration_maps_to_invalid_configuration_error() {
    let schema = json!({ "required": ["executor_config"] });
    let err = validate_configuration(&schema, &json!({}), "registry").unwrap_err();
    assert_eq!(err.kind, wf_core::ErrorKind::InvalidConfiguration);
    assert!(!err.retriable);
}
