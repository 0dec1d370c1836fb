//! Resolver over a fixed address list.

use crate::base::{ResolverError, Status};
use crate::resolver::{
    address::BalancerAddress,
    lifecycle::{BoxError, ResolveContext, ResolveFuture, ResolveStrategy, ResolverHandle},
    result::ResolverResult,
    serviceconfig::ServiceConfig,
};
use std::sync::Arc;

/// Delivers the same addresses on every refresh, starting as soon as the
/// resolver is started.
#[derive(Clone, Debug)]
pub struct StaticResolver {
    addresses: Arc<Vec<BalancerAddress>>,
    service_config: Option<Result<ServiceConfig, Status>>,
}

impl StaticResolver {
    pub fn new(addresses: Vec<BalancerAddress>) -> Self {
        Self {
            addresses: Arc::new(addresses),
            service_config: None,
        }
    }

    /// Deliver `config` with every result.
    pub fn with_service_config(mut self, config: ServiceConfig) -> Self {
        self.service_config = Some(Ok(config));
        self
    }

    /// Parse `json` as the service config.
    ///
    /// A document that fails to parse does not fail resolution: results
    /// carry the addresses, no config, and an `InvalidArgument` config status.
    pub fn with_service_config_json(mut self, json: &str) -> Self {
        self.service_config = Some(ServiceConfig::from_json(json).map_err(|e| {
            tracing::warn!(error = %e, "failed to parse static service config");
            Status::invalid_argument(format!("Failed to parse service config: {e}")).with_source(e)
        }));
        self
    }

    pub fn addresses(&self) -> &[BalancerAddress] {
        &self.addresses
    }

    fn result(&self) -> Result<ResolverResult, ResolverError> {
        let addresses = self.addresses.as_ref().clone();
        match &self.service_config {
            None => Ok(ResolverResult::for_result(addresses)),
            Some(Ok(config)) => {
                ResolverResult::for_result_with_config(addresses, Some(config.clone()), None)
            }
            Some(Err(status)) => {
                ResolverResult::for_result_with_config(addresses, None, Some(status.clone()))
            }
        }
    }
}

impl ResolveStrategy for StaticResolver {
    fn on_started(&self, resolver: &ResolverHandle) {
        if let Err(e) = resolver.refresh() {
            tracing::warn!(error = %e, "static resolver could not start resolution");
        }
    }

    fn resolve(&self, cx: ResolveContext) -> ResolveFuture {
        let result = self.result();
        Box::pin(async move {
            cx.deliver(result?);
            Ok::<(), BoxError>(())
        })
    }
}
