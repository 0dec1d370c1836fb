//! Host lookup backends.
//!
//! [`Resolve`] is the seam between [`crate::resolver::DnsResolver`] and
//! whatever actually answers name queries:
//! - [`HickoryResolver`]: async hickory-dns client (`hickory` feature)
//! - [`GaiResolver`]: the system resolver through `getaddrinfo`
//! - [`HostsResolver`]: a fixed host table in front of another backend
//!
//! # Example
//!
//! ```rust,ignore
//! use rpcresolve::dns::{GaiResolver, Name, Resolve};
//!
//! let ips = GaiResolver::new().resolve(Name::new("example.com")).await?;
//! ```

mod gai;
#[cfg(feature = "hickory")]
mod hickory;
mod hosts;
mod name;

pub use gai::GaiResolver;
#[cfg(feature = "hickory")]
pub use hickory::HickoryResolver;
pub use hosts::HostsResolver;
pub use name::Name;

use crate::base::LookupError;
use std::{future::Future, net::IpAddr, pin::Pin, sync::Arc};

/// An in-flight lookup.
pub type Lookup = Pin<Box<dyn Future<Output = Result<Vec<IpAddr>, LookupError>> + Send>>;

/// Answers "which IPs does this host have".
///
/// One query per call, no caching and no retries: the resolver decides when
/// to ask again. Dropping a [`Lookup`] must abandon the query, since that is
/// how disposal cancels it.
pub trait Resolve: Send + Sync {
    fn resolve(&self, name: Name) -> Lookup;
}

/// The lookup backend used when none is configured: hickory when the
/// `hickory` feature is enabled, getaddrinfo otherwise.
pub fn default_backend() -> Arc<dyn Resolve> {
    #[cfg(feature = "hickory")]
    {
        Arc::new(HickoryResolver::new())
    }
    #[cfg(not(feature = "hickory"))]
    {
        Arc::new(GaiResolver::new())
    }
}
