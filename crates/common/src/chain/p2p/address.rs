use std::net::{IpAddr, Ipv6Addr, SocketAddr};

use serde::{Deserialize, Serialize};

/// A fixed-format bootstrap peer record: a 16-byte address and a port.
///
/// IPv4 peers are stored in their IPv4-mapped IPv6 form (`::ffff:a.b.c.d`),
/// most significant byte first, so the last four bytes are the dotted quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeedAddress {
    /// The address in network byte order.
    pub addr: [u8; 16],
    /// The peer's port.
    pub port: u16,
}

impl SeedAddress {
    /// Creates a seed record from an IP address and port.
    pub fn new(ip: IpAddr, port: u16) -> Self {
        let addr = match ip {
            IpAddr::V4(v4) => v4.to_ipv6_mapped().octets(),
            IpAddr::V6(v6) => v6.octets(),
        };
        Self { addr, port }
    }

    /// Returns true if the record holds an IPv4-mapped address.
    pub fn is_ipv4(&self) -> bool {
        Ipv6Addr::from(self.addr).to_ipv4_mapped().is_some()
    }

    /// Returns the IP address held by the record, unmapping IPv4.
    pub fn ip(&self) -> IpAddr {
        let v6 = Ipv6Addr::from(self.addr);
        match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => IpAddr::V6(v6),
        }
    }

    /// Converts the record into a socket address suitable for connecting.
    pub fn to_socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip(), self.port)
    }
}

impl From<SocketAddr> for SeedAddress {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip(), addr.port())
    }
}

impl std::fmt::Display for SeedAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_socket_addr())
    }
}
