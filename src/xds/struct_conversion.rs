//! JSON to `google.protobuf.Struct` conversion.
//!
//! Overrides are usually authored as small JSON or YAML snippets. These
//! helpers turn them into the `Struct` tree the merger consumes, and back
//! again for inspection.

use crate::Result;
use prost_types::{value::Kind, ListValue, Struct, Value};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Convert a JSON object to a protobuf Struct.
pub fn json_to_struct(json: &JsonValue) -> Result<Struct> {
    match json {
        JsonValue::Object(map) => {
            let mut fields = BTreeMap::new();
            for (key, value) in map {
                fields.insert(key.clone(), json_to_proto_value(value)?);
            }
            Ok(Struct { fields })
        }
        _ => Err(crate::Error::config("Override must be a JSON object".to_string())),
    }
}

/// Convert a JSON value to a protobuf Value.
pub fn json_to_proto_value(json: &JsonValue) -> Result<Value> {
    let kind = match json {
        JsonValue::Null => Kind::NullValue(0),
        JsonValue::Bool(b) => Kind::BoolValue(*b),
        JsonValue::Number(n) => {
            // Protobuf only has double for numbers
            let num = n.as_f64().ok_or_else(|| {
                crate::Error::config(format!("Cannot convert number {} to f64", n))
            })?;
            Kind::NumberValue(num)
        }
        JsonValue::String(s) => Kind::StringValue(s.clone()),
        JsonValue::Array(arr) => {
            let values: Result<Vec<Value>> = arr.iter().map(json_to_proto_value).collect();
            Kind::ListValue(ListValue { values: values? })
        }
        JsonValue::Object(_) => Kind::StructValue(json_to_struct(json)?),
    };

    Ok(Value { kind: Some(kind) })
}

/// Convert a protobuf Struct back to JSON.
pub fn struct_to_json(s: &Struct) -> JsonValue {
    let map = s.fields.iter().map(|(key, value)| (key.clone(), proto_value_to_json(value)));
    JsonValue::Object(map.collect())
}

/// Convert a protobuf Value back to JSON.
pub fn proto_value_to_json(value: &Value) -> JsonValue {
    match &value.kind {
        Some(Kind::NullValue(_)) | None => JsonValue::Null,
        Some(Kind::BoolValue(b)) => JsonValue::Bool(*b),
        // JSON has no NaN or infinity
        Some(Kind::NumberValue(n)) => JsonValue::Number(
            serde_json::Number::from_f64(*n).unwrap_or_else(|| serde_json::Number::from(0)),
        ),
        Some(Kind::StringValue(s)) => JsonValue::String(s.clone()),
        Some(Kind::ListValue(list)) => {
            JsonValue::Array(list.values.iter().map(proto_value_to_json).collect())
        }
        Some(Kind::StructValue(s)) => struct_to_json(s),
    }
}
