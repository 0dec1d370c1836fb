use crate::base::Attributes;
use std::{
    fmt,
    hash::{Hash, Hasher},
    net::{IpAddr, SocketAddr},
};

/// A resolved endpoint handed to the load balancer.
///
/// Equality and hashing only consider host and port; attributes are opaque
/// metadata for the balancer.
#[derive(Clone, Debug)]
pub struct BalancerAddress {
    host: String,
    port: u16,
    attributes: Attributes,
}

impl BalancerAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            attributes: Attributes::new(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Parse the host as an IP address, when it is one.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.host.parse::<IpAddr>().ok().map(|ip| SocketAddr::new(ip, self.port))
    }
}

impl From<SocketAddr> for BalancerAddress {
    fn from(addr: SocketAddr) -> Self {
        BalancerAddress::new(addr.ip().to_string(), addr.port())
    }
}

impl PartialEq for BalancerAddress {
    fn eq(&self, other: &Self) -> bool {
        self.host == other.host && self.port == other.port
    }
}

impl Eq for BalancerAddress {}

impl Hash for BalancerAddress {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.host.hash(state);
        self.port.hash(state);
    }
}

impl fmt::Display for BalancerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_from_socket_addr() {
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let addr = BalancerAddress::from(SocketAddr::new(ip, 50051));
        assert_eq!(addr.host(), "10.0.0.1");
        assert_eq!(addr.port(), 50051);
        assert_eq!(addr.to_string(), "10.0.0.1:50051");
    }

    #[test]
    fn test_ipv6_display_is_bracketed() {
        let addr = BalancerAddress::from(SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 443));
        assert_eq!(addr.to_string(), "[::1]:443");
        assert_eq!(addr.socket_addr(), Some("[::1]:443".parse().unwrap()));
    }

    #[test]
    fn test_equality_ignores_attributes() {
        let plain = BalancerAddress::new("backend", 80);
        let tagged = BalancerAddress::new("backend", 80)
            .with_attributes(Attributes::new().with("weight", 3u32));

        assert_eq!(plain, tagged);
        assert!(plain.socket_addr().is_none());
    }
}
