//! Envoy xDS resource translation.
//!
//! Helpers that turn control-plane level descriptions (addresses, locality
//! labels, config identities, per-destination overrides) into the protobuf
//! shapes Envoy consumes, plus a few lookups over already-built resources.

pub mod address;
pub mod cluster;
pub mod listener;
pub mod locality;
pub mod merge;
pub mod metadata;
pub mod struct_conversion;

pub use address::{
    build_address, build_pipe_address, convert_address_to_cidr, network_endpoint_address,
    AddressFamily, NetworkEndpoint,
};
pub use cluster::clone_cluster;
pub use listener::{get_by_address, is_http_filter_chain};
pub use locality::{convert_locality, is_locality_empty, locality_match, locality_to_string};
pub use merge::{merge_any_with_json, merge_any_with_struct, TypedMessage};
pub use metadata::{build_config_info_metadata, ConfigMeta, MetadataBuilder};
pub use struct_conversion::{json_to_struct, struct_to_json};
