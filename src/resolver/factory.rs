//! Factories building resolvers for a target URL scheme.

use crate::base::ResolverError;
use crate::dns::{self, Resolve};
use crate::resolver::{
    address::BalancerAddress,
    dnsresolver::DnsResolver,
    lifecycle::Resolver,
    options::ResolverOptions,
    staticresolver::StaticResolver,
    target,
};
use std::{fmt, sync::Arc};
use url::Url;

/// Builds [`Resolver`]s for targets with one URL scheme.
pub trait ResolverFactory: Send + Sync {
    /// URL scheme handled by this factory, e.g. `dns`.
    fn scheme(&self) -> &str;

    /// Build an unstarted resolver for `target`.
    fn create(&self, target: &Url, options: &ResolverOptions) -> Result<Resolver, ResolverError>;
}

/// `dns:///host[:port]` and `dns://authority/host[:port]` targets.
///
/// The authority (a specific name server) is accepted but lookups go through
/// the configured backend.
#[derive(Clone)]
pub struct DnsResolverFactory {
    backend: Arc<dyn Resolve>,
}

impl DnsResolverFactory {
    pub fn new(backend: Arc<dyn Resolve>) -> Self {
        Self { backend }
    }
}

impl Default for DnsResolverFactory {
    fn default() -> Self {
        Self::new(dns::default_backend())
    }
}

impl ResolverFactory for DnsResolverFactory {
    fn scheme(&self) -> &str {
        "dns"
    }

    fn create(&self, target: &Url, options: &ResolverOptions) -> Result<Resolver, ResolverError> {
        let (host, port) = target::parse_host_port(target::endpoint(target), options.default_port)
            .map_err(|_| ResolverError::invalid_target(target.as_str(), "expected host[:port]"))?;
        tracing::debug!(target = %target, host = %host, port, "creating DNS resolver");

        let strategy = DnsResolver::new(host, port, Arc::clone(&self.backend))
            .with_options(options.dns.clone());
        Ok(Resolver::with_options(strategy, options))
    }
}

impl fmt::Debug for DnsResolverFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DnsResolverFactory").finish_non_exhaustive()
    }
}

/// `static:///host1:port1,host2:port2` targets.
///
/// When built with fixed addresses the target's endpoint list is ignored.
#[derive(Clone, Debug, Default)]
pub struct StaticResolverFactory {
    addresses: Option<Vec<BalancerAddress>>,
}

impl StaticResolverFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always resolve to `addresses`, whatever the target says.
    pub fn with_addresses(addresses: Vec<BalancerAddress>) -> Self {
        Self {
            addresses: Some(addresses),
        }
    }
}

impl ResolverFactory for StaticResolverFactory {
    fn scheme(&self) -> &str {
        "static"
    }

    fn create(&self, target: &Url, options: &ResolverOptions) -> Result<Resolver, ResolverError> {
        let addresses = match &self.addresses {
            Some(addresses) => addresses.clone(),
            None => target::endpoint(target)
                .split(',')
                .map(str::trim)
                .filter(|endpoint| !endpoint.is_empty())
                .map(|endpoint| {
                    target::parse_host_port(endpoint, options.default_port)
                        .map(|(host, port)| BalancerAddress::new(host, port))
                })
                .collect::<Result<Vec<_>, _>>()?,
        };
        if addresses.is_empty() {
            return Err(ResolverError::invalid_target(target.as_str(), "no addresses"));
        }
        Ok(Resolver::with_options(StaticResolver::new(addresses), options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::{Lookup, Name};

    struct NoLookups;

    impl Resolve for NoLookups {
        fn resolve(&self, _name: Name) -> Lookup {
            Box::pin(async { Ok(Vec::new()) })
        }
    }

    #[test]
    fn test_dns_factory_rejects_bad_target() {
        let factory = DnsResolverFactory::new(Arc::new(NoLookups));
        let target = Url::parse("dns:///host:notaport").unwrap();
        let err = factory.create(&target, &ResolverOptions::default()).unwrap_err();
        assert!(matches!(err, ResolverError::InvalidTarget { .. }));
    }

    #[test]
    fn test_dns_factory_names_resolver() {
        let factory = DnsResolverFactory::new(Arc::new(NoLookups));
        let target = Url::parse("dns:///greeter.internal:50051").unwrap();
        let resolver = factory.create(&target, &ResolverOptions::default()).unwrap();
        assert_eq!(resolver.name(), "DnsResolver");
    }

    #[test]
    fn test_static_factory_parses_endpoints() {
        let target = Url::parse("static:///10.0.0.1:80,10.0.0.2").unwrap();
        let resolver = StaticResolverFactory::new()
            .create(&target, &ResolverOptions::new().default_port(8080))
            .unwrap();
        assert_eq!(resolver.name(), "StaticResolver");
    }

    #[test]
    fn test_static_factory_requires_addresses() {
        let target = Url::parse("static:///").unwrap();
        let err = StaticResolverFactory::new().create(&target, &ResolverOptions::default());
        assert!(matches!(err, Err(ResolverError::InvalidTarget { .. })));
    }
}
