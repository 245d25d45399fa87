//! Minimal JSON-schema argument checks
//!
//! Covers the subset of JSON schema that tool definitions use: required
//! fields, primitive types, `enum`, `minItems`/`maxItems`, and nested
//! object/array items. Unknown keywords are ignored.

use serde_json::Value;

/// Validate `args` against `schema`, returning the first violation
pub fn validate(schema: &Value, args: &Value) -> Result<(), String> {
    validate_at(schema, args, "")
}

fn validate_at(schema: &Value, value: &Value, path: &str) -> Result<(), String> {
    let label = if path.is_empty() { "arguments" } else { path };

    if let Some(expected) = schema.get("type").and_then(Value::as_str) {
        if !type_matches(expected, value) {
            return Err(format!(
                "'{}' must be of type {}, got {}",
                label,
                expected,
                type_name(value)
            ));
        }
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            let options: Vec<String> = allowed.iter().map(|v| v.to_string()).collect();
            return Err(format!(
                "'{}' must be one of [{}], got {}",
                label,
                options.join(", "),
                value
            ));
        }
    }

    match value {
        Value::Object(map) => {
            if let Some(required) = schema.get("required").and_then(Value::as_array) {
                for field in required.iter().filter_map(Value::as_str) {
                    if map.get(field).is_none_or(Value::is_null) {
                        return Err(format!("Missing required parameter '{}'", join(path, field)));
                    }
                }
            }

            if let Some(props) = schema.get("properties").and_then(Value::as_object) {
                for (key, prop_schema) in props {
                    match map.get(key) {
                        // Optional fields may be sent as explicit nulls
                        Some(Value::Null) | None => {}
                        Some(v) => validate_at(prop_schema, v, &join(path, key))?,
                    }
                }
            }
        }
        Value::Array(items) => {
            if let Some(min) = schema.get("minItems").and_then(Value::as_u64) {
                if (items.len() as u64) < min {
                    return Err(format!(
                        "'{}' must contain at least {} items, got {}",
                        label,
                        min,
                        items.len()
                    ));
                }
            }
            if let Some(max) = schema.get("maxItems").and_then(Value::as_u64) {
                if (items.len() as u64) > max {
                    return Err(format!(
                        "'{}' must contain at most {} items, got {}",
                        label,
                        max,
                        items.len()
                    ));
                }
            }
            if let Some(item_schema) = schema.get("items") {
                for (i, item) in items.iter().enumerate() {
                    validate_at(item_schema, item, &format!("{}[{}]", label, i))?;
                }
            }
        }
        _ => {}
    }

    Ok(())
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
