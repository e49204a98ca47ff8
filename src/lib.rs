//! # Flowplane xDS
//!
//! Translation helpers shared by the Flowplane control plane when it turns
//! its own model of services, endpoints and gateways into Envoy xDS
//! resources.
//!
//! ## Components
//!
//! ```text
//! control-plane model ──► xds::{address, locality, metadata} ──► Envoy protobuf
//!                                                                      │
//! per-destination overrides ──► xds::merge ◄───────────────────────────┘
//! ```
//!
//! - **Addresses**: CIDR ranges, socket and pipe addresses
//! - **Localities**: `region/zone/subzone` labels and match rules
//! - **Metadata**: config identity attached to generated resources
//! - **Merge**: patch a serialized filter config with a partial override
//! - **Lookups**: cluster copies, HTTP filter chain detection, listener by address
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use flowplane_xds::xds::{convert_locality, locality_to_string, merge_any_with_json};
//!
//! let locality = convert_locality("us-east1/us-east1-b/rack7");
//! assert_eq!(locality_to_string(locality.as_ref()), "us-east1/us-east1-b/rack7");
//! # let hcm_any = Default::default();
//! let _merged = merge_any_with_json(&hcm_any, &serde_json::json!({ "server_name": "edge" }));
//! ```

pub mod config;
pub mod errors;
pub mod observability;
pub mod xds;

// Re-export commonly used types and traits
pub use config::Config;
pub use errors::{Error, Result};
pub use observability::init_logging;

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
