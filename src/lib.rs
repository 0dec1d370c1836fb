//! # rpcresolve
//!
//! Name resolution for RPC client channels.
//!
//! `rpcresolve` turns a logical target such as `dns:///greeter.internal:50051`
//! into a continuously updated set of addresses (plus optional service
//! configuration) that a load balancer consumes.
//!
//! ## Features
//!
//! - **Single registration**: a resolver accepts exactly one listener
//! - **Refresh de-duplication**: at most one resolution attempt in flight
//! - **Cooperative cancellation**: disposal cancels in-flight lookups
//! - **Failures as data**: strategy errors and panics become delivered
//!   failure results, never crashes
//! - **Pluggable strategies**: DNS (hickory or getaddrinfo) and static lists
//!   built in, anything else via [`resolver::ResolveStrategy`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rpcresolve::resolver::{ResolverOptions, ResolverRegistry};
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = ResolverRegistry::with_defaults();
//!     let resolver = registry
//!         .create_for("dns:///localhost:50051", &ResolverOptions::default())
//!         .unwrap();
//!     resolver.start(|result| println!("{:?}", result.addresses())).unwrap();
//!     // ...
//!     resolver.dispose();
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Status values, attributes, and error definitions
//! - [`dns`] - Host lookup backends
//! - [`resolver`] - Resolver core, results, strategies, and factories

pub mod base;
pub mod dns;
pub mod resolver;
