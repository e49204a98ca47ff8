//! Resource helpers used together: building listeners from endpoint
//! descriptors and tagging them with config identity.

use envoy_types::pb::envoy::config::listener::v3::{Filter, FilterChain, Listener};
use flowplane_xds::config::TranslationConfig;
use flowplane_xds::xds::{
    build_config_info_metadata, get_by_address, is_http_filter_chain,
    listener::{HTTP_CONNECTION_MANAGER, TCP_PROXY},
    network_endpoint_address, AddressFamily, ConfigMeta, MetadataBuilder, NetworkEndpoint,
};

fn gateway_meta(name: &str) -> ConfigMeta {
    ConfigMeta {
        group: "networking.flowplane.io".to_string(),
        version: "v1".to_string(),
        name: name.to_string(),
        namespace: "edge".to_string(),
        domain: "cluster.local".to_string(),
        kind: "gateway".to_string(),
    }
}

fn listener(name: &str, endpoint: &NetworkEndpoint, filter: &str) -> Listener {
    Listener {
        name: name.to_string(),
        address: Some(network_endpoint_address(endpoint)),
        metadata: Some(build_config_info_metadata(&gateway_meta(name))),
        filter_chains: vec![FilterChain {
            filters: vec![Filter { name: filter.to_string(), config_type: None }],
            ..Default::default()
        }],
        ..Default::default()
    }
}

#[test]
fn finds_listener_for_endpoint() {
    let http = NetworkEndpoint {
        family: AddressFamily::Tcp,
        address: "0.0.0.0".to_string(),
        port: 8080,
    };
    let uds = NetworkEndpoint {
        family: AddressFamily::Unix,
        address: "/var/run/flowplane/admin.sock".to_string(),
        port: 0,
    };
    let listeners = vec![
        listener("http", &http, HTTP_CONNECTION_MANAGER),
        listener("admin", &uds, TCP_PROXY),
    ];

    let found = get_by_address(&listeners, &network_endpoint_address(&http)).unwrap();
    assert_eq!(found.name, "http");
    assert!(is_http_filter_chain(&found.filter_chains[0]));

    let found = get_by_address(&listeners, &network_endpoint_address(&uds)).unwrap();
    assert_eq!(found.name, "admin");
    assert!(!is_http_filter_chain(&found.filter_chains[0]));
}

#[test]
fn metadata_key_follows_config() {
    let config = TranslationConfig { metadata_key: "mesh".to_string() };
    let metadata = MetadataBuilder::from_config(&config).build(&gateway_meta("public"));

    assert!(metadata.filter_metadata.contains_key("mesh"));
    assert!(!metadata.filter_metadata.contains_key("flowplane"));
}
