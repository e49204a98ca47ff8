//! Field layout of the Envoy v3 API.
//!
//! Generated message types carry no runtime schema, so the merger reads
//! field names, numbers and types from a serialized `FileDescriptorSet`
//! compiled from the same protos as `envoy-types` (source info stripped).

use crate::{Error, Result};
use once_cell::sync::Lazy;
use prost::Message;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorSet};
use std::collections::HashMap;

static ENVOY_DESCRIPTOR_SET: &[u8] = include_bytes!("../../../proto/envoy.desc");

static POOL: Lazy<std::result::Result<DescriptorPool, String>> =
    Lazy::new(|| DescriptorPool::decode(ENVOY_DESCRIPTOR_SET).map_err(|e| e.to_string()));

/// Shared pool over the embedded Envoy descriptors.
pub(crate) fn pool() -> Result<&'static DescriptorPool> {
    POOL.as_ref().map_err(|e| Error::config(format!("Embedded descriptor set is invalid: {}", e)))
}

/// Messages and enums indexed by fully-qualified name (no leading dot).
#[derive(Debug, Default)]
pub(crate) struct DescriptorPool {
    messages: HashMap<String, MessageDescriptor>,
    enums: HashMap<String, EnumDescriptor>,
}

#[derive(Debug, Clone)]
pub(crate) struct MessageDescriptor {
    pub full_name: String,
    pub fields: Vec<FieldDescriptor>,
    /// Synthetic `FooEntry` message backing a map field
    pub map_entry: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct FieldDescriptor {
    pub name: String,
    pub json_name: String,
    pub number: u32,
    pub ty: Type,
    pub repeated: bool,
    /// Message or enum type for `Type::Message` / `Type::Enum` fields
    pub type_name: String,
}

#[derive(Debug, Clone)]
pub(crate) struct EnumDescriptor {
    pub values: Vec<(String, i32)>,
}

impl DescriptorPool {
    pub(crate) fn decode(bytes: &[u8]) -> std::result::Result<Self, prost::DecodeError> {
        let set = FileDescriptorSet::decode(bytes)?;

        let mut pool = Self::default();
        for file in &set.file {
            for message in &file.message_type {
                pool.add_message(file.package(), message);
            }
            for enumeration in &file.enum_type {
                pool.add_enum(file.package(), enumeration);
            }
        }

        Ok(pool)
    }

    fn add_message(&mut self, scope: &str, message: &DescriptorProto) {
        let full_name = qualify(scope, message.name());

        for nested in &message.nested_type {
            self.add_message(&full_name, nested);
        }
        for enumeration in &message.enum_type {
            self.add_enum(&full_name, enumeration);
        }

        let descriptor = MessageDescriptor {
            full_name: full_name.clone(),
            fields: message.field.iter().map(FieldDescriptor::from_proto).collect(),
            map_entry: message.options.as_ref().is_some_and(|options| options.map_entry()),
        };
        self.messages.insert(full_name, descriptor);
    }

    fn add_enum(&mut self, scope: &str, enumeration: &EnumDescriptorProto) {
        let values =
            enumeration.value.iter().map(|v| (v.name().to_string(), v.number())).collect();
        self.enums.insert(qualify(scope, enumeration.name()), EnumDescriptor { values });
    }

    pub(crate) fn message(&self, full_name: &str) -> Option<&MessageDescriptor> {
        self.messages.get(full_name)
    }

    pub(crate) fn enumeration(&self, full_name: &str) -> Option<&EnumDescriptor> {
        self.enums.get(full_name)
    }
}

impl MessageDescriptor {
    /// Look a field up by proto name or JSON name.
    pub(crate) fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == key || f.json_name == key)
    }

    pub(crate) fn field_by_number(&self, number: u32) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.number == number)
    }
}

impl FieldDescriptor {
    fn from_proto(field: &FieldDescriptorProto) -> Self {
        Self {
            name: field.name().to_string(),
            json_name: field.json_name.clone().unwrap_or_else(|| lower_camel(field.name())),
            number: u32::try_from(field.number()).unwrap_or_default(),
            ty: field.r#type(),
            repeated: field.label() == Label::Repeated,
            type_name: field.type_name().trim_start_matches('.').to_string(),
        }
    }
}

impl EnumDescriptor {
    pub(crate) fn number(&self, name: &str) -> Option<i32> {
        self.values.iter().find(|(value, _)| value == name).map(|(_, number)| *number)
    }
}

fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scope, name)
    }
}

fn lower_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
