//! Override merging for already-serialized filter configuration.
//!
//! Filter configs reach this point as type-tagged `Any` payloads. A
//! per-destination override, written without knowledge of the full schema,
//! is layered on top:
//!
//! 1. the payload is decoded into a [`TypedMessage`] according to its type URL;
//! 2. the override tree is encoded against the message's descriptor and merged
//!    in with protobuf merge rules: scalars present in the override replace the
//!    base value, nested messages merge recursively, repeated fields append,
//!    unknown keys are ignored;
//! 3. the result is re-encoded under the original type URL.
//!
//! Decoding (unknown type, corrupt bytes, or an override value that does not
//! fit its field) and encoding failures surface as distinct [`Error`] variants
//! and never produce partial output.
//!
//! ```rust,ignore
//! use flowplane_xds::xds::merge::merge_any_with_json;
//!
//! let merged = merge_any_with_json(&hcm_any, &serde_json::json!({
//!     "xff_num_trusted_hops": 2,
//!     "http_filters": [{ "name": "envoy.filters.http.cors" }]
//! }))?;
//! ```

mod descriptors;
mod schema;

use crate::xds::struct_conversion::json_to_struct;
use crate::{xds_span, Error, Result};
use envoy_types::pb::envoy::extensions::filters::network::http_connection_manager::v3::HttpConnectionManager;
use envoy_types::pb::envoy::extensions::filters::network::tcp_proxy::v3::TcpProxy;
use envoy_types::pb::google::protobuf::Any;
use prost::Message;
use prost_types::Struct;
use schema::{encode_message, merge_untyped};
use serde_json::Value as JsonValue;
use tracing::debug;

pub const HTTP_CONNECTION_MANAGER_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.filters.network.http_connection_manager.v3.HttpConnectionManager";
pub const TCP_PROXY_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.filters.network.tcp_proxy.v3.TcpProxy";
pub const STRUCT_TYPE_URL: &str = "type.googleapis.com/google.protobuf.Struct";

/// Fully-qualified message name: everything after the last `/` of a type URL.
pub(crate) fn message_name(type_url: &str) -> &str {
    type_url.rsplit('/').next().unwrap_or(type_url)
}

/// A decoded `Any` payload.
///
/// Known message kinds are decoded into their generated types; anything else
/// is carried untouched as `Raw` and can be re-encoded but not merged.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedMessage {
    HttpConnectionManager(HttpConnectionManager),
    TcpProxy(TcpProxy),
    Struct(Struct),
    Raw(Any),
}

impl TypedMessage {
    /// Decode an `Any` by its type URL.
    pub fn decode(any: &Any) -> Result<Self> {
        let bytes = any.value.as_slice();
        let decoded = if message_name(&any.type_url) == message_name(HTTP_CONNECTION_MANAGER_TYPE_URL)
        {
            HttpConnectionManager::decode(bytes).map(Self::HttpConnectionManager)
        } else if message_name(&any.type_url) == message_name(TCP_PROXY_TYPE_URL) {
            TcpProxy::decode(bytes).map(Self::TcpProxy)
        } else if message_name(&any.type_url) == message_name(STRUCT_TYPE_URL) {
            Struct::decode(bytes).map(Self::Struct)
        } else {
            return Ok(Self::Raw(any.clone()));
        };

        decoded.map_err(|e| Error::decode(&any.type_url, e.to_string()))
    }

    /// Empty message for a type URL, or `None` if the type is not known.
    pub fn empty(type_url: &str) -> Option<Self> {
        match message_name(type_url) {
            name if name == message_name(HTTP_CONNECTION_MANAGER_TYPE_URL) => {
                Some(Self::HttpConnectionManager(HttpConnectionManager::default()))
            }
            name if name == message_name(TCP_PROXY_TYPE_URL) => {
                Some(Self::TcpProxy(TcpProxy::default()))
            }
            name if name == message_name(STRUCT_TYPE_URL) => Some(Self::Struct(Struct::default())),
            _ => None,
        }
    }

    pub fn type_url(&self) -> &str {
        match self {
            Self::HttpConnectionManager(_) => HTTP_CONNECTION_MANAGER_TYPE_URL,
            Self::TcpProxy(_) => TCP_PROXY_TYPE_URL,
            Self::Struct(_) => STRUCT_TYPE_URL,
            Self::Raw(any) => &any.type_url,
        }
    }

    /// Fold an override tree into this message.
    pub fn merge_struct(&mut self, overrides: &Struct) -> Result<()> {
        let type_url = self.type_url().to_string();
        match self {
            Self::Struct(base) => {
                merge_untyped(base, overrides);
                return Ok(());
            }
            Self::Raw(_) => return Err(Error::decode(type_url, "unsupported message type")),
            Self::HttpConnectionManager(_) | Self::TcpProxy(_) => {}
        }

        let pool = descriptors::pool()?;
        let descriptor = pool
            .message(message_name(&type_url))
            .ok_or_else(|| Error::decode(&type_url, "unsupported message type"))?;

        let mut patch = Vec::new();
        encode_message(pool, descriptor, overrides, &mut patch)
            .map_err(|e| e.into_error(&type_url))?;

        let merged = match self {
            Self::HttpConnectionManager(hcm) => hcm.merge(patch.as_slice()),
            Self::TcpProxy(proxy) => proxy.merge(patch.as_slice()),
            Self::Struct(_) | Self::Raw(_) => Ok(()),
        };
        merged.map_err(|e| Error::decode(&type_url, e.to_string()))
    }

    /// Serialize the message body.
    pub fn encode_value(&self) -> Result<Vec<u8>> {
        fn encode<M: Message>(message: &M, type_url: &str) -> Result<Vec<u8>> {
            let mut buf = Vec::with_capacity(message.encoded_len());
            message.encode(&mut buf).map_err(|e| Error::encode(type_url, e.to_string()))?;
            Ok(buf)
        }

        match self {
            Self::HttpConnectionManager(hcm) => encode(hcm, self.type_url()),
            Self::TcpProxy(proxy) => encode(proxy, self.type_url()),
            Self::Struct(s) => encode(s, self.type_url()),
            Self::Raw(any) => Ok(any.value.clone()),
        }
    }

    /// Serialize into an `Any` carrying the canonical type URL.
    pub fn to_any(&self) -> Result<Any> {
        Ok(Any { type_url: self.type_url().to_string(), value: self.encode_value()? })
    }
}

impl From<HttpConnectionManager> for TypedMessage {
    fn from(hcm: HttpConnectionManager) -> Self {
        Self::HttpConnectionManager(hcm)
    }
}

impl From<TcpProxy> for TypedMessage {
    fn from(proxy: TcpProxy) -> Self {
        Self::TcpProxy(proxy)
    }
}

impl From<Struct> for TypedMessage {
    fn from(s: Struct) -> Self {
        Self::Struct(s)
    }
}

/// Merge an override tree into a type-tagged message.
///
/// Returns a new `Any` with the same type URL as `any`; the input is left
/// untouched.
pub fn merge_any_with_struct(any: &Any, overrides: &Struct) -> Result<Any> {
    let _span = xds_span!("merge_any_with_struct", any.type_url).entered();

    let mut message = TypedMessage::decode(any)?;
    message.merge_struct(overrides)?;
    let value = message.encode_value()?;

    debug!(fields = overrides.fields.len(), bytes = value.len(), "merged override into message");
    Ok(Any { type_url: any.type_url.clone(), value })
}

/// Merge a JSON override into a type-tagged message.
pub fn merge_any_with_json(any: &Any, overrides: &JsonValue) -> Result<Any> {
    let overrides = json_to_struct(overrides).map_err(|e| Error::decode(&any.type_url, e.to_string()))?;
    merge_any_with_struct(any, &overrides)
}
