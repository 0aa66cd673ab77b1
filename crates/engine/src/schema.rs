// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Walks a JSON-Schema-shaped configuration document against a work item's
//! configuration, reporting the first violation with a dotted path.
//!
//! Not a general-purpose JSON Schema implementation: only the keywords an
//! executor's `GetSchema()` is required to carry (`type`, `required`,
//! `properties`, `items`, `enum`, `pattern`, `minimum`, `maximum`) are
//! understood. Anything else in the document is ignored.

use regex::Regex;
use serde_json::Value;
use wf_core::WorkflowError;

/// A single schema violation: the dotted path to the offending value and a
/// human-readable description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Validates `value` against `schema`, returning the first violation
/// encountered in a depth-first, property-declaration-order walk.
pub fn validate(schema: &Value, value: &Value) -> Result<(), Violation> {
    walk(schema, value, "$")
}

/// Validates `configuration` against `schema` and converts the first
/// violation (if any) into an `invalid-configuration` [`WorkflowError`].
pub fn validate_configuration(schema: &Value, configuration: &Value, source: &str) -> Result<(), WorkflowError> {
    validate(schema, configuration)
        .map_err(|v| WorkflowError::invalid_configuration(source, v.to_string()))
}

fn walk(schema: &Value, value: &Value, path: &str) -> Result<(), Violation> {
    let Some(schema_obj) = schema.as_object() else {
        return Ok(());
    };

    if let Some(expected) = schema_obj.get("type").and_then(Value::as_str) {
        if !type_matches(expected, value) {
            return Err(Violation {
                path: path.to_string(),
                message: format!("expected type {expected}, found {}", type_name(value)),
            });
        }
    }

    if let Some(enum_values) = schema_obj.get("enum").and_then(Value::as_array) {
        if !enum_values.contains(value) {
            return Err(Violation { path: path.to_string(), message: "value is not one of the allowed enum values".into() });
        }
    }

    if let Some(pattern) = schema_obj.get("pattern").and_then(Value::as_str) {
        if let Some(s) = value.as_str() {
            let re = Regex::new(pattern)
                .map_err(|e| Violation { path: path.to_string(), message: format!("invalid pattern {pattern:?}: {e}") })?;
            if !re.is_match(s) {
                return Err(Violation { path: path.to_string(), message: format!("value does not match pattern {pattern:?}") });
            }
        }
    }

    if let Some(min) = schema_obj.get("minimum").and_then(Value::as_f64) {
        if let Some(n) = value.as_f64() {
            if n < min {
                return Err(Violation { path: path.to_string(), message: format!("value {n} is below minimum {min}") });
            }
        }
    }

    if let Some(max) = schema_obj.get("maximum").and_then(Value::as_f64) {
        if let Some(n) = value.as_f64() {
            if n > max {
                return Err(Violation { path: path.to_string(), message: format!("value {n} is above maximum {max}") });
            }
        }
    }

    if let Some(required) = schema_obj.get("required").and_then(Value::as_array) {
        let obj = value.as_object();
        for key in required {
            let Some(key) = key.as_str() else { continue };
            let present = obj.map(|o| o.contains_key(key)).unwrap_or(false);
            if !present {
                return Err(Violation { path: format!("{path}.{key}"), message: "required property is missing".into() });
            }
        }
    }

    if let Some(properties) = schema_obj.get("properties").and_then(Value::as_object) {
        if let Some(obj) = value.as_object() {
            for (key, sub_schema) in properties {
                if let Some(sub_value) = obj.get(key) {
                    walk(sub_schema, sub_value, &format!("{path}.{key}"))?;
                }
            }
        }
    }

    if let Some(items_schema) = schema_obj.get("items") {
        if let Some(items) = value.as_array() {
            for (i, item) in items.iter().enumerate() {
                walk(items_schema, item, &format!("{path}[{i}]"))?;
            }
        }
    }

    Ok(())
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
