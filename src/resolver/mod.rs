//! Name resolution for RPC channels.
//!
//! A [`Resolver`] turns a target into a stream of [`ResolverResult`]s pushed
//! to a listener. The pieces:
//! - [`lifecycle`]: the resolver core and the [`ResolveStrategy`] extension trait
//! - [`result`]: the delivered value and its construction rules
//! - [`staticresolver`], [`dnsresolver`]: built-in strategies
//! - [`factory`], [`registry`]: building resolvers from target URLs
//! - [`sink`]: lifecycle event logging
//!
//! # Example
//!
//! ```rust,ignore
//! use rpcresolve::resolver::{ResolverOptions, ResolverRegistry};
//!
//! let registry = ResolverRegistry::with_defaults();
//! let options = ResolverOptions::default();
//! let resolver = registry.create_for("dns:///greeter.internal:50051", &options)?;
//! resolver.start(|result| match result.addresses() {
//!     Some(addrs) => println!("{} addresses", addrs.len()),
//!     None => println!("resolution failed: {}", result.status()),
//! })?;
//! ```

pub mod address;
pub mod dnsresolver;
pub mod factory;
pub mod lifecycle;
pub mod options;
pub mod registry;
pub mod result;
pub mod serviceconfig;
pub mod sink;
pub mod staticresolver;
pub mod target;

pub use address::BalancerAddress;
pub use dnsresolver::DnsResolver;
pub use factory::{DnsResolverFactory, ResolverFactory, StaticResolverFactory};
pub use lifecycle::{
    BoxError, Listener, ResolveContext, ResolveFuture, ResolveStrategy, Resolver, ResolverHandle,
};
pub use options::{DnsResolverOptions, ResolverOptions};
pub use registry::ResolverRegistry;
pub use result::ResolverResult;
pub use serviceconfig::ServiceConfig;
pub use sink::{NoopSink, ResolverSink, TracingSink};
pub use staticresolver::StaticResolver;
