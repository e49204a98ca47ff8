//! Descriptor-driven override encoding.
//!
//! The override tree is walked against the descriptor of its target message:
//! every key is resolved to a declared field (by proto or JSON name) and
//! written out as protobuf wire records. Merging those records into a
//! decoded message then applies protobuf merge rules:
//!
//! - singular fields named by the override replace the base value, zeros
//!   included, since they are written to the wire explicitly;
//! - nested messages merge into the existing value, or a fresh one;
//! - repeated fields append after the base elements;
//! - map entries replace the base entry with the same key.
//!
//! Keys naming no field are skipped. A `null` value leaves the field as it
//! is. A value whose shape does not fit its field fails with the field path.

use super::descriptors::{DescriptorPool, FieldDescriptor, MessageDescriptor};
use super::message_name;
use crate::Error;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine as _;
use envoy_types::pb::google::protobuf::Duration;
use prost::encoding::{encode_key, encode_varint, WireType};
use prost::Message;
use prost_types::field_descriptor_proto::Type;
use prost_types::{value::Kind, Struct, Value};
use tracing::debug;

const ANY_TYPE_KEY: &str = "@type";
const ANY: &str = "google.protobuf.Any";
const DURATION: &str = "google.protobuf.Duration";
const STRUCT: &str = "google.protobuf.Struct";
const VALUE: &str = "google.protobuf.Value";
const LIST_VALUE: &str = "google.protobuf.ListValue";

/// Why an override could not be encoded against its target.
#[derive(Debug)]
pub(crate) struct MergeError {
    path: String,
    reason: String,
}

impl MergeError {
    fn field<S: Into<String>>(reason: S) -> Self {
        Self { path: String::new(), reason: reason.into() }
    }

    fn mismatch(expected: &str, value: &Value) -> Self {
        Self::field(format!("expected {}, got {}", expected, describe(value)))
    }

    fn within(self, segment: &str) -> Self {
        let path = if self.path.is_empty() {
            segment.to_string()
        } else if self.path.starts_with('[') {
            format!("{}{}", segment, self.path)
        } else {
            format!("{}.{}", segment, self.path)
        };
        Self { path, reason: self.reason }
    }

    /// Report against the top-level message identified by `type_url`.
    pub(crate) fn into_error(self, type_url: &str) -> Error {
        if self.path.is_empty() {
            Error::decode(type_url, self.reason)
        } else {
            Error::decode(type_url, format!("field '{}': {}", self.path, self.reason))
        }
    }
}

pub(crate) type EncodeResult<T = ()> = std::result::Result<T, MergeError>;

/// Append wire records for every override key that names a field of `message`.
pub(crate) fn encode_message(
    pool: &DescriptorPool,
    message: &MessageDescriptor,
    overrides: &Struct,
    buf: &mut Vec<u8>,
) -> EncodeResult {
    for (key, value) in &overrides.fields {
        let Some(field) = message.field(key) else {
            if key != ANY_TYPE_KEY {
                debug!(
                    message = %message.full_name,
                    field = %key,
                    "ignoring override key with no matching field"
                );
            }
            continue;
        };

        if is_null(value) && field.type_name != VALUE {
            continue;
        }

        encode_field(pool, field, value, buf).map_err(|e| e.within(&field.name))?;
    }

    Ok(())
}

fn encode_field(
    pool: &DescriptorPool,
    field: &FieldDescriptor,
    value: &Value,
    buf: &mut Vec<u8>,
) -> EncodeResult {
    if !field.repeated {
        return encode_single(pool, field, value, buf);
    }

    let entry = match field.ty {
        Type::Message => pool.message(&field.type_name).filter(|m| m.map_entry),
        _ => None,
    };

    match (entry, &value.kind) {
        (Some(entry), Some(Kind::StructValue(entries))) => {
            let (Some(key_field), Some(value_field)) =
                (entry.field_by_number(1), entry.field_by_number(2))
            else {
                return Err(MergeError::field(format!("malformed map entry '{}'", entry.full_name)));
            };

            for (key, item) in &entries.fields {
                let mut record = Vec::new();
                encode_single(pool, key_field, &map_key(key_field, key), &mut record)
                    .map_err(|e| e.within(key))?;
                encode_single(pool, value_field, item, &mut record).map_err(|e| e.within(key))?;
                write_bytes(field.number, &record, buf);
            }
            Ok(())
        }
        (Some(_), _) => Err(MergeError::mismatch("object", value)),
        (None, Some(Kind::ListValue(list))) => {
            for (idx, item) in list.values.iter().enumerate() {
                encode_single(pool, field, item, buf).map_err(|e| e.within(&format!("[{}]", idx)))?;
            }
            Ok(())
        }
        (None, _) => Err(MergeError::mismatch("list", value)),
    }
}

/// JSON object keys are strings; map keys of other types are spelled out.
fn map_key(key_field: &FieldDescriptor, key: &str) -> Value {
    let kind = match (key_field.ty, key) {
        (Type::Bool, "true") => Kind::BoolValue(true),
        (Type::Bool, "false") => Kind::BoolValue(false),
        _ => Kind::StringValue(key.to_string()),
    };
    Value { kind: Some(kind) }
}

fn encode_single(
    pool: &DescriptorPool,
    field: &FieldDescriptor,
    value: &Value,
    buf: &mut Vec<u8>,
) -> EncodeResult {
    match field.ty {
        Type::Message => {
            let mut body = Vec::new();
            encode_message_value(pool, &field.type_name, value, &mut body)?;
            write_bytes(field.number, &body, buf);
            Ok(())
        }
        Type::Enum => {
            let number = match &value.kind {
                Some(Kind::StringValue(name)) => pool
                    .enumeration(&field.type_name)
                    .and_then(|e| e.number(name))
                    .ok_or_else(|| {
                        MergeError::field(format!("unknown value '{}' for enum {}", name, field.type_name))
                    })?,
                _ => as_i32(value)?,
            };
            write_varint(field.number, number as i64 as u64, buf);
            Ok(())
        }
        Type::Group => Err(MergeError::field("group fields are not supported")),
        ty => encode_scalar(field.number, ty, value, buf),
    }
}

/// Body of a message-typed value, honouring the JSON forms of well-known types.
fn encode_message_value(
    pool: &DescriptorPool,
    type_name: &str,
    value: &Value,
    buf: &mut Vec<u8>,
) -> EncodeResult {
    if let Some(inner) = wrapper_type(type_name) {
        if !matches!(value.kind, Some(Kind::StructValue(_))) {
            return encode_scalar(1, inner, value, buf);
        }
    }

    match (type_name, &value.kind) {
        (DURATION, Some(Kind::StringValue(text))) => {
            let duration = parse_duration(text)?;
            write_varint(1, duration.seconds as u64, buf);
            write_varint(2, duration.nanos as i64 as u64, buf);
        }
        (STRUCT, Some(Kind::StructValue(s))) => buf.extend_from_slice(&s.encode_to_vec()),
        (STRUCT, _) => return Err(MergeError::mismatch("object", value)),
        (VALUE, _) => buf.extend_from_slice(&value.encode_to_vec()),
        (LIST_VALUE, Some(Kind::ListValue(list))) => buf.extend_from_slice(&list.encode_to_vec()),
        (LIST_VALUE, _) => return Err(MergeError::mismatch("list", value)),
        (ANY, Some(Kind::StructValue(fields))) => encode_any(pool, fields, buf)?,
        (_, Some(Kind::StructValue(fields))) => {
            let descriptor = pool
                .message(type_name)
                .ok_or_else(|| MergeError::field(format!("unknown message type '{}'", type_name)))?;
            encode_message(pool, descriptor, fields, buf)?;
        }
        _ => return Err(MergeError::mismatch("object", value)),
    }

    Ok(())
}

/// Embedded `Any` in JSON form: `{"@type": url, ...fields}`. Well-known
/// types with a non-object JSON form carry it under `value`.
fn encode_any(pool: &DescriptorPool, fields: &Struct, buf: &mut Vec<u8>) -> EncodeResult {
    let type_url = match fields.fields.get(ANY_TYPE_KEY).and_then(|v| v.kind.as_ref()) {
        Some(Kind::StringValue(url)) => url,
        _ => return Err(MergeError::field("embedded message requires an '@type' string")),
    };
    let type_name = message_name(type_url);

    let mut body = Vec::new();
    if has_value_form(type_name) {
        let inner = fields.fields.get("value").ok_or_else(|| {
            MergeError::field(format!("'{}' payload must be given under 'value'", type_name))
        })?;
        encode_message_value(pool, type_name, inner, &mut body).map_err(|e| e.within("value"))?;
    } else {
        let descriptor = pool.message(type_name).ok_or_else(|| {
            MergeError::field(format!("unsupported message type '{}'", type_url))
        })?;
        encode_message(pool, descriptor, fields, &mut body)?;
    }

    write_bytes(1, type_url.as_bytes(), buf);
    write_bytes(2, &body, buf);
    Ok(())
}

fn has_value_form(type_name: &str) -> bool {
    matches!(type_name, DURATION | STRUCT | VALUE | LIST_VALUE) || wrapper_type(type_name).is_some()
}

fn wrapper_type(type_name: &str) -> Option<Type> {
    let ty = match type_name {
        "google.protobuf.DoubleValue" => Type::Double,
        "google.protobuf.FloatValue" => Type::Float,
        "google.protobuf.Int64Value" => Type::Int64,
        "google.protobuf.UInt64Value" => Type::Uint64,
        "google.protobuf.Int32Value" => Type::Int32,
        "google.protobuf.UInt32Value" => Type::Uint32,
        "google.protobuf.BoolValue" => Type::Bool,
        "google.protobuf.StringValue" => Type::String,
        "google.protobuf.BytesValue" => Type::Bytes,
        _ => return None,
    };
    Some(ty)
}

fn encode_scalar(number: u32, ty: Type, value: &Value, buf: &mut Vec<u8>) -> EncodeResult {
    match ty {
        Type::Double => {
            encode_key(number, WireType::SixtyFourBit, buf);
            buf.extend_from_slice(&as_f64(value)?.to_le_bytes());
        }
        Type::Float => {
            encode_key(number, WireType::ThirtyTwoBit, buf);
            buf.extend_from_slice(&(as_f64(value)? as f32).to_le_bytes());
        }
        Type::Int64 => write_varint(number, as_i64(value)? as u64, buf),
        Type::Uint64 => write_varint(number, as_u64(value)?, buf),
        Type::Int32 => write_varint(number, as_i32(value)? as i64 as u64, buf),
        Type::Uint32 => write_varint(number, u64::from(as_u32(value)?), buf),
        Type::Sint32 => {
            let n = as_i32(value)?;
            write_varint(number, u64::from(((n << 1) ^ (n >> 31)) as u32), buf);
        }
        Type::Sint64 => {
            let n = as_i64(value)?;
            write_varint(number, ((n << 1) ^ (n >> 63)) as u64, buf);
        }
        Type::Fixed32 => {
            encode_key(number, WireType::ThirtyTwoBit, buf);
            buf.extend_from_slice(&as_u32(value)?.to_le_bytes());
        }
        Type::Sfixed32 => {
            encode_key(number, WireType::ThirtyTwoBit, buf);
            buf.extend_from_slice(&as_i32(value)?.to_le_bytes());
        }
        Type::Fixed64 => {
            encode_key(number, WireType::SixtyFourBit, buf);
            buf.extend_from_slice(&as_u64(value)?.to_le_bytes());
        }
        Type::Sfixed64 => {
            encode_key(number, WireType::SixtyFourBit, buf);
            buf.extend_from_slice(&as_i64(value)?.to_le_bytes());
        }
        Type::Bool => match &value.kind {
            Some(Kind::BoolValue(b)) => write_varint(number, u64::from(*b), buf),
            _ => return Err(MergeError::mismatch("bool", value)),
        },
        Type::String => match &value.kind {
            Some(Kind::StringValue(s)) => write_bytes(number, s.as_bytes(), buf),
            _ => return Err(MergeError::mismatch("string", value)),
        },
        Type::Bytes => match &value.kind {
            Some(Kind::StringValue(s)) => {
                let decoded = STANDARD
                    .decode(s)
                    .or_else(|_| URL_SAFE.decode(s))
                    .map_err(|_| MergeError::field("bytes must be base64 encoded"))?;
                write_bytes(number, &decoded, buf);
            }
            _ => return Err(MergeError::mismatch("base64 string", value)),
        },
        Type::Enum | Type::Message | Type::Group => {
            return Err(MergeError::field(format!("{:?} is not a scalar type", ty)))
        }
    }
    Ok(())
}

fn write_varint(number: u32, value: u64, buf: &mut Vec<u8>) {
    encode_key(number, WireType::Varint, buf);
    encode_varint(value, buf);
}

fn write_bytes(number: u32, bytes: &[u8], buf: &mut Vec<u8>) {
    encode_key(number, WireType::LengthDelimited, buf);
    encode_varint(bytes.len() as u64, buf);
    buf.extend_from_slice(bytes);
}

/// Schema-less merge: nested structs merge, lists append, everything else replaces.
pub(crate) fn merge_untyped(base: &mut Struct, overrides: &Struct) {
    for (key, value) in &overrides.fields {
        let merged = match (base.fields.get_mut(key), &value.kind) {
            (
                Some(Value { kind: Some(Kind::StructValue(existing)) }),
                Some(Kind::StructValue(nested)),
            ) => {
                merge_untyped(existing, nested);
                true
            }
            (Some(Value { kind: Some(Kind::ListValue(existing)) }), Some(Kind::ListValue(list))) => {
                existing.values.extend(list.values.iter().cloned());
                true
            }
            _ => false,
        };

        if !merged {
            base.fields.insert(key.clone(), value.clone());
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match &value.kind {
        None | Some(Kind::NullValue(_)) => "null",
        Some(Kind::NumberValue(_)) => "number",
        Some(Kind::StringValue(_)) => "string",
        Some(Kind::BoolValue(_)) => "bool",
        Some(Kind::StructValue(_)) => "object",
        Some(Kind::ListValue(_)) => "list",
    }
}

fn is_null(value: &Value) -> bool {
    matches!(value.kind, None | Some(Kind::NullValue(_)))
}

fn as_f64(value: &Value) -> EncodeResult<f64> {
    match &value.kind {
        Some(Kind::NumberValue(n)) => Ok(*n),
        Some(Kind::StringValue(s)) => match s.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            other => other
                .trim()
                .parse::<f64>()
                .map_err(|_| MergeError::field(format!("'{}' is not a number", other))),
        },
        _ => Err(MergeError::mismatch("number", value)),
    }
}

/// Integral number, or a string holding one (proto JSON allows both).
fn as_i64(value: &Value) -> EncodeResult<i64> {
    match &value.kind {
        Some(Kind::NumberValue(n)) if n.fract() == 0.0 && n.abs() <= i64::MAX as f64 => {
            Ok(*n as i64)
        }
        Some(Kind::NumberValue(n)) => Err(MergeError::field(format!("{} is not an integer", n))),
        Some(Kind::StringValue(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| MergeError::field(format!("'{}' is not an integer", s))),
        _ => Err(MergeError::mismatch("integer", value)),
    }
}

fn as_u64(value: &Value) -> EncodeResult<u64> {
    match &value.kind {
        Some(Kind::StringValue(s)) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| MergeError::field(format!("'{}' is not an unsigned integer", s))),
        _ => {
            let n = as_i64(value)?;
            u64::try_from(n).map_err(|_| MergeError::field(format!("{} is out of range for uint64", n)))
        }
    }
}

fn as_u32(value: &Value) -> EncodeResult<u32> {
    let n = as_i64(value)?;
    u32::try_from(n).map_err(|_| MergeError::field(format!("{} is out of range for uint32", n)))
}

fn as_i32(value: &Value) -> EncodeResult<i32> {
    let n = as_i64(value)?;
    i32::try_from(n).map_err(|_| MergeError::field(format!("{} is out of range for int32", n)))
}

/// Proto JSON duration: decimal seconds with an `s` suffix, e.g. `"1.5s"`.
pub(crate) fn parse_duration(text: &str) -> EncodeResult<Duration> {
    let invalid = || MergeError::field(format!("invalid duration '{}'", text));

    let body = text.trim().strip_suffix('s').ok_or_else(invalid)?;
    let (negative, body) = match body.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, body),
    };
    let (whole, fraction) = body.split_once('.').unwrap_or((body, ""));

    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty())
        || fraction.len() > 9
        || !digits(whole)
        || !digits(fraction)
    {
        return Err(invalid());
    }

    let seconds: i64 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| invalid())? };
    let nanos: i32 =
        if fraction.is_empty() { 0 } else { format!("{:0<9}", fraction).parse().map_err(|_| invalid())? };

    Ok(if negative {
        Duration { seconds: -seconds, nanos: -nanos }
    } else {
        Duration { seconds, nanos }
    })
}
