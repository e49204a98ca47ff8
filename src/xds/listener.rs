//! Listener and filter chain inspection.

use envoy_types::pb::envoy::config::core::v3::Address;
use envoy_types::pb::envoy::config::listener::v3::{FilterChain, Listener};

/// Well-known name of the HTTP connection manager network filter.
pub const HTTP_CONNECTION_MANAGER: &str = "envoy.filters.network.http_connection_manager";

/// Well-known name of the TCP proxy network filter.
pub const TCP_PROXY: &str = "envoy.filters.network.tcp_proxy";

/// True if the chain terminates HTTP, i.e. it contains an HTTP connection
/// manager filter anywhere in its filter list.
pub fn is_http_filter_chain(filter_chain: &FilterChain) -> bool {
    filter_chain.filters.iter().any(|filter| filter.name == HTTP_CONNECTION_MANAGER)
}

/// Find the first listener bound to exactly `address`.
pub fn get_by_address<'a>(listeners: &'a [Listener], address: &Address) -> Option<&'a Listener> {
    listeners.iter().find(|listener| listener.address.as_ref() == Some(address))
}
