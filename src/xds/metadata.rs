//! Config identity metadata.
//!
//! Every wire object produced from a mesh configuration resource carries the
//! resource's API path in its filter metadata so that operators can trace a
//! proxy setting back to the object that produced it.

use crate::config::{TranslationConfig, DEFAULT_METADATA_KEY};
use envoy_types::pb::envoy::config::core::v3::Metadata;
use envoy_types::pb::google::protobuf::{value::Kind, Struct, Value};
use std::collections::HashMap;

/// Well-known filter-metadata key holding config identity.
pub const CONFIG_METADATA_KEY: &str = DEFAULT_METADATA_KEY;

/// Field inside the metadata struct that holds the config path.
pub const CONFIG_FIELD: &str = "config";

/// Identity of a mesh configuration resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMeta {
    pub group: String,
    pub version: String,
    pub name: String,
    pub namespace: String,
    pub domain: String,
    pub kind: String,
}

impl ConfigMeta {
    /// API path of the resource, e.g.
    /// `/apis/networking.flowplane.io/v1/namespaces/default/destination-rule/svcA`.
    pub fn config_path(&self) -> String {
        format!(
            "/apis/{}/{}/namespaces/{}/{}/{}",
            self.group, self.version, self.namespace, self.kind, self.name
        )
    }
}

/// Builds config identity metadata under a fixed filter-metadata key.
#[derive(Debug, Clone)]
pub struct MetadataBuilder {
    key: String,
}

impl MetadataBuilder {
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self { key: key.into() }
    }

    pub fn from_config(config: &TranslationConfig) -> Self {
        Self::new(config.metadata_key.clone())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn build(&self, meta: &ConfigMeta) -> Metadata {
        let fields = HashMap::from([(
            CONFIG_FIELD.to_string(),
            Value { kind: Some(Kind::StringValue(meta.config_path())) },
        )]);

        Metadata {
            filter_metadata: HashMap::from([(self.key.clone(), Struct { fields })]),
            ..Default::default()
        }
    }
}

impl Default for MetadataBuilder {
    fn default() -> Self {
        Self::new(CONFIG_METADATA_KEY)
    }
}

/// Build config identity metadata under [`CONFIG_METADATA_KEY`].
pub fn build_config_info_metadata(meta: &ConfigMeta) -> Metadata {
    MetadataBuilder::default().build(meta)
}
