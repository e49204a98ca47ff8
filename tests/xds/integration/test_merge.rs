//! Override merging through the public API, starting from JSON-authored
//! base configs the way the control plane builds them.

use envoy_types::pb::envoy::extensions::filters::network::http_connection_manager::v3::{
    http_connection_manager::RouteSpecifier, HttpConnectionManager,
};
use envoy_types::pb::google::protobuf::Any;
use flowplane_xds::xds::merge::{
    merge_any_with_json, TypedMessage, HTTP_CONNECTION_MANAGER_TYPE_URL,
};
use flowplane_xds::Error;
use prost::Message;
use serde_json::json;

fn hcm_any(hcm: HttpConnectionManager) -> Any {
    TypedMessage::from(hcm).to_any().unwrap()
}

fn rds_hcm(route_config_name: &str) -> HttpConnectionManager {
    let base = hcm_any(HttpConnectionManager::default());
    let merged = merge_any_with_json(
        &base,
        &json!({
            "stat_prefix": "ingress_http",
            "rds": { "route_config_name": route_config_name },
            "http_filters": [{ "name": "envoy.filters.http.router" }]
        }),
    )
    .unwrap();
    HttpConnectionManager::decode(merged.value.as_slice()).unwrap()
}

#[test]
fn builds_config_from_empty_message() {
    let hcm = rds_hcm("default-routes");

    assert_eq!(hcm.stat_prefix, "ingress_http");
    assert_eq!(hcm.http_filters.len(), 1);
    match hcm.route_specifier {
        Some(RouteSpecifier::Rds(rds)) => assert_eq!(rds.route_config_name, "default-routes"),
        other => panic!("Expected RDS route specifier, got {:?}", other),
    }
}

#[test]
fn successive_overrides_accumulate() {
    let base = hcm_any(rds_hcm("default-routes"));

    let first = merge_any_with_json(
        &base,
        &json!({ "http_filters": [{ "name": "envoy.filters.http.cors" }] }),
    )
    .unwrap();
    let second = merge_any_with_json(
        &first,
        &json!({
            "http_filters": [{ "name": "envoy.filters.http.local_ratelimit" }],
            "rds": { "route_config_name": "team-a-routes" }
        }),
    )
    .unwrap();

    let hcm = HttpConnectionManager::decode(second.value.as_slice()).unwrap();
    let names: Vec<_> = hcm.http_filters.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "envoy.filters.http.router",
            "envoy.filters.http.cors",
            "envoy.filters.http.local_ratelimit"
        ]
    );
    match hcm.route_specifier {
        Some(RouteSpecifier::Rds(rds)) => assert_eq!(rds.route_config_name, "team-a-routes"),
        other => panic!("Expected RDS route specifier, got {:?}", other),
    }
}

#[test]
fn empty_override_keeps_message() {
    let base = hcm_any(rds_hcm("default-routes"));
    let merged = merge_any_with_json(&base, &json!({})).unwrap();

    assert_eq!(
        HttpConnectionManager::decode(merged.value.as_slice()).unwrap(),
        rds_hcm("default-routes")
    );
}

#[test]
fn nested_error_names_field_path() {
    let base = hcm_any(rds_hcm("default-routes"));
    let err = merge_any_with_json(
        &base,
        &json!({ "common_http_protocol_options": { "idle_timeout": "five minutes" } }),
    )
    .unwrap_err();

    match err {
        Error::Decode { type_url, reason } => {
            assert_eq!(type_url, HTTP_CONNECTION_MANAGER_TYPE_URL);
            assert!(reason.contains("common_http_protocol_options.idle_timeout"), "{}", reason);
        }
        other => panic!("Expected decode error, got {:?}", other),
    }
}

#[test]
fn null_override_keeps_field() {
    let base = hcm_any(rds_hcm("default-routes"));
    let merged =
        merge_any_with_json(&base, &json!({ "stat_prefix": null, "rds": null })).unwrap();

    assert_eq!(
        HttpConnectionManager::decode(merged.value.as_slice()).unwrap(),
        rds_hcm("default-routes")
    );
}
