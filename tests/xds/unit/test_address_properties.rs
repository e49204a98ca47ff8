use envoy_types::pb::envoy::config::core::v3::{address::Address as AddressType, socket_address};
use flowplane_xds::xds::address::{
    build_address, convert_address_to_cidr, network_endpoint_address, AddressFamily,
    NetworkEndpoint,
};
use proptest::prelude::*;
use std::net::{Ipv4Addr, Ipv6Addr};

proptest! {
    #[test]
    fn ipv4_without_prefix_is_host_range(octets in any::<[u8; 4]>()) {
        let ip = Ipv4Addr::from(octets).to_string();
        let cidr = convert_address_to_cidr(&ip).unwrap();
        prop_assert_eq!(cidr.address_prefix, ip);
        prop_assert_eq!(cidr.prefix_len.map(|p| p.value), Some(32));
    }

    #[test]
    fn ipv6_without_prefix_is_host_range(segments in any::<[u16; 8]>()) {
        let ip = Ipv6Addr::from(segments).to_string();
        let cidr = convert_address_to_cidr(&ip).unwrap();
        prop_assert_eq!(cidr.address_prefix, ip);
        prop_assert_eq!(cidr.prefix_len.map(|p| p.value), Some(128));
    }

    #[test]
    fn explicit_prefix_is_kept(octets in any::<[u8; 4]>(), len in 0u32..=32) {
        let ip = Ipv4Addr::from(octets).to_string();
        let cidr = convert_address_to_cidr(&format!("{}/{}", ip, len)).unwrap();
        prop_assert_eq!(cidr.address_prefix, ip);
        prop_assert_eq!(cidr.prefix_len.map(|p| p.value), Some(len));
    }

    #[test]
    fn non_numeric_prefix_is_rejected(len in "[a-z]{1,4}") {
        let cidr = format!("10.0.0.0/{}", len);
        prop_assert!(convert_address_to_cidr(&cidr).is_none());
    }

    #[test]
    fn tcp_endpoint_keeps_port(port in 1u32..=65535) {
        let endpoint = NetworkEndpoint {
            family: AddressFamily::Tcp,
            address: "10.1.2.3".to_string(),
            port,
        };

        let address = network_endpoint_address(&endpoint);
        prop_assert_eq!(&address, &build_address("10.1.2.3", port));
        match address.address {
            Some(AddressType::SocketAddress(sa)) => {
                prop_assert_eq!(sa.port_specifier, Some(socket_address::PortSpecifier::PortValue(port)));
            }
            other => prop_assert!(false, "expected socket address, got {:?}", other),
        }
    }

    #[test]
    fn unix_endpoint_ignores_port(port in any::<u32>(), path in "/[a-z]{1,12}/[a-z]{1,12}\\.sock") {
        let endpoint = NetworkEndpoint { family: AddressFamily::Unix, address: path.clone(), port };

        match network_endpoint_address(&endpoint).address {
            Some(AddressType::Pipe(pipe)) => prop_assert_eq!(pipe.path, path),
            other => prop_assert!(false, "expected pipe, got {:?}", other),
        }
    }

    #[test]
    fn unknown_family_numbers_are_rejected(n in 2i32..) {
        prop_assert!(AddressFamily::try_from(n).is_err());
    }
}
