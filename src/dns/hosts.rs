//! Host table lookups.
//!
//! Pins selected names to fixed IPs, the way `/etc/hosts` does for the
//! system resolver, and forwards every other name to a fallback backend.
//! [`crate::resolver::DnsResolverOptions::hosts`] installs one in front of
//! the configured backend.

use super::{Lookup, Name, Resolve};
use std::{collections::HashMap, fmt, future, net::IpAddr, sync::Arc};

pub struct HostsResolver {
    hosts: Arc<HashMap<Name, Vec<IpAddr>>>,
    fallback: Arc<dyn Resolve>,
}

impl HostsResolver {
    pub fn new<I, N>(hosts: I, fallback: Arc<dyn Resolve>) -> Self
    where
        I: IntoIterator<Item = (N, Vec<IpAddr>)>,
        N: Into<Name>,
    {
        let hosts = hosts
            .into_iter()
            .map(|(name, ips)| (name.into(), ips))
            .collect();
        Self {
            hosts: Arc::new(hosts),
            fallback,
        }
    }

    /// The pinned IPs for `name`, if it is in the table.
    pub fn get(&self, name: &Name) -> Option<&[IpAddr]> {
        self.hosts.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

impl Resolve for HostsResolver {
    fn resolve(&self, name: Name) -> Lookup {
        match self.get(&name) {
            Some(ips) => {
                tracing::trace!(host = %name, count = ips.len(), "host answered from table");
                Box::pin(future::ready(Ok(ips.to_vec())))
            }
            None => self.fallback.resolve(name),
        }
    }
}

impl fmt::Debug for HostsResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&Name> = self.hosts.keys().collect();
        names.sort();
        f.debug_struct("HostsResolver")
            .field("hosts", &names)
            .finish_non_exhaustive()
    }
}
