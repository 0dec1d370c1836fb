use crate::base::ResolverError;
use crate::resolver::{
    factory::{DnsResolverFactory, ResolverFactory, StaticResolverFactory},
    lifecycle::Resolver,
    options::ResolverOptions,
};
use dashmap::DashMap;
use std::{fmt, sync::Arc};
use url::Url;

/// Maps target URL schemes to resolver factories.
///
/// Safe to share between channels; registration and lookup may happen
/// concurrently.
pub struct ResolverRegistry {
    factories: DashMap<String, Arc<dyn ResolverFactory>>,
}

impl ResolverRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            factories: DashMap::new(),
        }
    }

    /// A registry with the `dns` and `static` factories.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(Arc::new(DnsResolverFactory::default()));
        registry.register(Arc::new(StaticResolverFactory::new()));
        registry
    }

    /// Register `factory` for its scheme, returning the factory it replaced.
    pub fn register(&self, factory: Arc<dyn ResolverFactory>) -> Option<Arc<dyn ResolverFactory>> {
        let scheme = factory.scheme().to_ascii_lowercase();
        tracing::debug!(scheme = %scheme, "registering resolver factory");
        self.factories.insert(scheme, factory)
    }

    pub fn get(&self, scheme: &str) -> Option<Arc<dyn ResolverFactory>> {
        self.factories.get(&scheme.to_ascii_lowercase()).map(|f| Arc::clone(f.value()))
    }

    /// Registered schemes, sorted.
    pub fn schemes(&self) -> Vec<String> {
        let mut schemes: Vec<String> = self.factories.iter().map(|e| e.key().clone()).collect();
        schemes.sort();
        schemes
    }

    /// Build a resolver for `target` with the factory registered for its
    /// scheme.
    pub fn create(
        &self,
        target: &Url,
        options: &ResolverOptions,
    ) -> Result<Resolver, ResolverError> {
        let factory = self
            .get(target.scheme())
            .ok_or_else(|| ResolverError::UnsupportedScheme(target.scheme().to_string()))?;
        factory.create(target, options)
    }

    /// Parse `target` and build a resolver for it.
    pub fn create_for(
        &self,
        target: &str,
        options: &ResolverOptions,
    ) -> Result<Resolver, ResolverError> {
        let url = Url::parse(target)
            .map_err(|_| ResolverError::invalid_target(target, "not a valid URL"))?;
        self.create(&url, options)
    }
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverRegistry").field("schemes", &self.schemes()).finish()
    }
}
