//! Base types and error handling.
//!
//! Provides the value types every resolver shares:
//! - [`Status`]: RPC-style status code and detail
//! - [`Attributes`]: metadata bag for addresses and results
//! - [`ResolverError`]: usage errors raised synchronously
//! - [`ResolverState`]: resolver lifecycle states

pub mod attributes;
pub mod context;
pub mod error;
pub mod state;
pub mod status;

pub use attributes::Attributes;
pub use error::{Cancelled, LookupError, ResolvePanic, ResolverError};
pub use state::ResolverState;
pub use status::{Code, Status};
