//! Lookups through the operating system resolver.
//!
//! `getaddrinfo` blocks, so every query runs on tokio's blocking pool. It
//! honours `/etc/hosts`, `nsswitch.conf` and whatever else the platform
//! configures, and is the default backend when the `hickory` feature is off.

use super::{Lookup, Name, Resolve};
use crate::base::LookupError;
use std::{
    io,
    net::{IpAddr, ToSocketAddrs},
};

/// System resolver backend.
///
/// Dropping the [`Lookup`] abandons the answer, but the blocking call itself
/// still runs to completion on the pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct GaiResolver;

impl GaiResolver {
    pub fn new() -> Self {
        Self
    }
}

fn getaddrinfo(host: &str) -> io::Result<Vec<IpAddr>> {
    let ips = (host, 0).to_socket_addrs()?.map(|addr| addr.ip()).collect();
    Ok(ips)
}

impl Resolve for GaiResolver {
    fn resolve(&self, name: Name) -> Lookup {
        Box::pin(async move {
            let query = name.clone();
            let answer = tokio::task::spawn_blocking(move || getaddrinfo(query.as_str()))
                .await
                .map_err(|e| {
                    tracing::error!(host = %name, error = %e, "getaddrinfo task failed");
                    LookupError::NameNotResolved
                })?;

            let ips = answer.map_err(|e| LookupError::dns_failed(name.as_str(), e))?;
            if ips.is_empty() {
                let empty = io::Error::new(io::ErrorKind::NotFound, "no addresses returned");
                return Err(LookupError::dns_failed(name.as_str(), empty));
            }

            tracing::debug!(host = %name, count = ips.len(), "getaddrinfo lookup complete");
            Ok(ips)
        })
    }
}
