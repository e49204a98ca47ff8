//! Cluster reuse helpers.
//!
//! Built clusters are cached and patched incrementally (locality weights,
//! priorities, endpoint sets). A patched copy must never leak changes back
//! into the cached original that other proxies are still being served.

use envoy_types::pb::envoy::config::cluster::v3::Cluster;

/// Deep-copy a cluster.
///
/// Generated protobuf types own all of their nested messages, repeated fields
/// and maps, so the copy shares no storage with `cluster`.
pub fn clone_cluster(cluster: &Cluster) -> Cluster {
    cluster.clone()
}
