use std::{fmt, net::IpAddr, sync::Arc};

/// A host name in canonical form: ASCII lowercase, without the trailing
/// root dot.
///
/// `Greeter.Internal.` and `greeter.internal` are the same `Name`, so host
/// tables match regardless of how a target spelled the host.
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Name(Arc<str>);

impl Name {
    pub fn new(host: impl AsRef<str>) -> Self {
        let host = host.as_ref();
        let host = host.strip_suffix('.').unwrap_or(host);
        Name(host.to_ascii_lowercase().into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The address itself when the name is an IPv4 or IPv6 literal.
    pub fn ip_literal(&self) -> Option<IpAddr> {
        self.0.parse().ok()
    }
}

impl From<&str> for Name {
    fn from(host: &str) -> Self {
        Name::new(host)
    }
}

impl From<String> for Name {
    fn from(host: String) -> Self {
        Name::new(host)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", self.as_str())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
