//! Async DNS lookup backend using hickory-dns.
//!
//! Supports system configuration auto-detection as well as explicit name
//! server configuration (including DoH/DoT upstreams).
//!
//! Unlike `GaiResolver`, this backend is fully async, so dropping the lookup
//! future on resolver disposal actually stops the query.

use super::{Lookup, Name, Resolve};
use crate::base::LookupError;
use hickory_resolver::{
    config::{LookupIpStrategy, ResolverConfig},
    name_server::TokioConnectionProvider,
    TokioResolver,
};
use std::{
    io,
    net::IpAddr,
    sync::{Arc, LazyLock},
};

/// Async lookup backend backed by hickory-dns.
///
/// `new()` shares one lazily built resolver configured from the system's
/// DNS settings; `with_config` builds a dedicated one.
///
/// # Example
///
/// ```rust,ignore
/// use rpcresolve::dns::{HickoryResolver, Name, Resolve};
///
/// let backend = HickoryResolver::new();
/// let addrs = backend.resolve(Name::new("example.com")).await?;
/// ```
#[derive(Debug, Clone)]
pub struct HickoryResolver {
    resolver: Arc<TokioResolver>,
}

impl HickoryResolver {
    /// Creates a backend sharing the process-wide system-configured resolver.
    ///
    /// If the system configuration cannot be read, hickory's defaults are
    /// used instead.
    pub fn new() -> Self {
        static SYSTEM: LazyLock<Arc<TokioResolver>> = LazyLock::new(|| {
            let mut builder = match TokioResolver::builder_tokio() {
                Ok(builder) => {
                    tracing::debug!("Using system DNS configuration");
                    builder
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read system DNS config, using defaults");
                    TokioResolver::builder_with_config(
                        ResolverConfig::default(),
                        TokioConnectionProvider::default(),
                    )
                }
            };
            builder.options_mut().ip_strategy = LookupIpStrategy::Ipv4AndIpv6;
            Arc::new(builder.build())
        });

        Self {
            resolver: Arc::clone(&SYSTEM),
        }
    }

    /// Creates a backend with explicit name servers.
    pub fn with_config(config: ResolverConfig) -> Self {
        let mut builder =
            TokioResolver::builder_with_config(config, TokioConnectionProvider::default());
        builder.options_mut().ip_strategy = LookupIpStrategy::Ipv4AndIpv6;
        Self {
            resolver: Arc::new(builder.build()),
        }
    }
}

impl Default for HickoryResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolve for HickoryResolver {
    fn resolve(&self, name: Name) -> Lookup {
        let resolver = Arc::clone(&self.resolver);
        Box::pin(async move {
            let domain = name.as_str();
            tracing::debug!(domain = %domain, "resolving via hickory-dns");

            let lookup = resolver.lookup_ip(domain).await.map_err(|e| {
                tracing::debug!(domain = %domain, error = %e, "hickory-dns lookup failed");
                let cause = io::Error::new(io::ErrorKind::NotFound, e.to_string());
                LookupError::dns_failed(domain, cause)
            })?;

            let ips: Vec<IpAddr> = lookup.iter().collect();
            if ips.is_empty() {
                return Err(LookupError::dns_failed(
                    domain,
                    io::Error::new(io::ErrorKind::NotFound, "No addresses returned"),
                ));
            }

            tracing::debug!(domain = %domain, count = ips.len(), "hickory-dns lookup complete");
            Ok(ips)
        })
    }
}
