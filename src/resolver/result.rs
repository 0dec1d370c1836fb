//! The value a resolver delivers to its listener.

use crate::base::{Attributes, ResolverError, Status};
use crate::resolver::{address::BalancerAddress, serviceconfig::ServiceConfig};
use std::{any::Any, borrow::Cow, sync::Arc};

/// Outcome of one resolution attempt.
///
/// Either a failure status, or a list of addresses plus an optional service
/// config (which may itself have failed to load). Instances are only built
/// through the named constructors, which enforce:
///
/// - a failure never carries addresses,
/// - a failure status is never OK,
/// - an OK service config status always comes with a service config.
#[derive(Clone, Debug)]
pub struct ResolverResult {
    status: Status,
    addresses: Option<Vec<BalancerAddress>>,
    service_config: Option<Arc<ServiceConfig>>,
    service_config_status: Option<Status>,
    attributes: Option<Attributes>,
}

impl ResolverResult {
    /// A failed resolution. `status` must not be OK.
    pub fn for_failure(status: Status) -> Result<Self, ResolverError> {
        if status.is_ok() {
            return Err(ResolverError::InvalidArgument(
                "resolver failure requires a non-OK status",
            ));
        }
        Ok(Self::failure(status))
    }

    /// A successful resolution without service config.
    pub fn for_result(addresses: Vec<BalancerAddress>) -> Self {
        Self {
            status: Status::ok(),
            addresses: Some(addresses),
            service_config: None,
            service_config_status: None,
            attributes: None,
        }
    }

    /// A successful resolution with service config information.
    ///
    /// `service_config_status` describes an error fetching or parsing the
    /// config; it may only be OK when a config is present.
    pub fn for_result_with_config(
        addresses: Vec<BalancerAddress>,
        service_config: Option<ServiceConfig>,
        service_config_status: Option<Status>,
    ) -> Result<Self, ResolverError> {
        if service_config.is_none() && service_config_status.as_ref().is_some_and(Status::is_ok) {
            return Err(ResolverError::InvalidArgument(
                "an OK service config status requires a service config",
            ));
        }
        Ok(Self {
            service_config: service_config.map(Arc::new),
            service_config_status,
            ..Self::for_result(addresses)
        })
    }

    /// Failure without the OK check, for statuses built with a fixed code.
    pub(crate) fn failure(status: Status) -> Self {
        Self {
            status,
            addresses: None,
            service_config: None,
            service_config_status: None,
            attributes: None,
        }
    }

    /// Attach implementation-specific metadata before the result is
    /// delivered.
    pub fn with_attribute<T>(mut self, key: impl Into<Cow<'static, str>>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.attributes.get_or_insert_with(Attributes::new).insert(key, value);
        self
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// Resolved addresses; `None` on failure, possibly empty on success.
    pub fn addresses(&self) -> Option<&[BalancerAddress]> {
        self.addresses.as_deref()
    }

    pub fn service_config(&self) -> Option<&Arc<ServiceConfig>> {
        self.service_config.as_ref()
    }

    pub fn service_config_status(&self) -> Option<&Status> {
        self.service_config_status.as_ref()
    }

    pub fn attributes(&self) -> &Attributes {
        self.attributes.as_ref().unwrap_or(Attributes::empty())
    }

    /// Number of addresses, zero on failure.
    pub fn address_count(&self) -> usize {
        self.addresses.as_ref().map_or(0, Vec::len)
    }
}
