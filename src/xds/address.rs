//! Address conversion helpers
//!
//! Turns textual IPs/CIDRs and mesh endpoint descriptors into Envoy
//! `Address` and `CidrRange` messages.

use crate::{Error, Result};
use envoy_types::pb::envoy::config::core::v3::{
    address::Address as AddressType, socket_address::PortSpecifier, Address, CidrRange, Pipe,
    SocketAddress,
};
use envoy_types::pb::google::protobuf::UInt32Value;
use std::fmt;
use std::str::FromStr;

/// Address family of a mesh endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    /// IP address plus port
    Tcp,
    /// Filesystem path of a Unix domain socket; the port is ignored
    Unix,
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::Tcp => write!(f, "tcp"),
            AddressFamily::Unix => write!(f, "unix"),
        }
    }
}

impl FromStr for AddressFamily {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" | "ip" => Ok(AddressFamily::Tcp),
            "unix" | "uds" | "pipe" => Ok(AddressFamily::Unix),
            other => Err(Error::UnsupportedAddressFamily(other.to_string())),
        }
    }
}

impl TryFrom<i32> for AddressFamily {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(AddressFamily::Tcp),
            1 => Ok(AddressFamily::Unix),
            other => Err(Error::UnsupportedAddressFamily(other.to_string())),
        }
    }
}

/// Endpoint descriptor from the mesh model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkEndpoint {
    pub family: AddressFamily,
    pub address: String,
    pub port: u32,
}

/// Convert an IP or CIDR string into a `CidrRange`.
///
/// Without an explicit prefix length the range covers a single host: 32 bits
/// for IPv4 and 128 for IPv6 (any address containing `:`). Returns `None` for
/// an empty string or an unparsable prefix length.
pub fn convert_address_to_cidr(addr: &str) -> Option<CidrRange> {
    if addr.is_empty() {
        return None;
    }

    let (address_prefix, prefix_len) = match addr.split_once('/') {
        Some((prefix, len)) => (prefix, len.parse::<u32>().ok()?),
        None if addr.contains(':') => (addr, 128),
        None => (addr, 32),
    };

    Some(CidrRange {
        address_prefix: address_prefix.to_string(),
        prefix_len: Some(UInt32Value { value: prefix_len }),
    })
}

/// Build a socket address for `ip:port`.
pub fn build_address(ip: &str, port: u32) -> Address {
    Address {
        address: Some(AddressType::SocketAddress(SocketAddress {
            address: ip.to_string(),
            port_specifier: Some(PortSpecifier::PortValue(port)),
            ..Default::default()
        })),
    }
}

/// Build a pipe address for a Unix domain socket path.
pub fn build_pipe_address(path: &str) -> Address {
    Address { address: Some(AddressType::Pipe(Pipe { path: path.to_string(), mode: 0 })) }
}

/// Convert a mesh endpoint into its Envoy address.
pub fn network_endpoint_address(endpoint: &NetworkEndpoint) -> Address {
    match endpoint.family {
        AddressFamily::Unix => build_pipe_address(&endpoint.address),
        AddressFamily::Tcp => build_address(&endpoint.address, endpoint.port),
    }
}
