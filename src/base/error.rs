use crate::base::status::Code;
use std::{io, sync::Arc};
use thiserror::Error;

/// Usage errors reported synchronously to the caller that misused a resolver.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ResolverError {
    #[error("Invalid operation: {0}")]
    InvalidOperation(&'static str),
    #[error("Resolver has been disposed")]
    Disposed,
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("No Tokio runtime available to run resolution")]
    NoRuntime,
    #[error("No resolver registered for scheme '{0}'")]
    UnsupportedScheme(String),
    #[error("Invalid target '{target}': {reason}")]
    InvalidTarget {
        target: String,
        reason: &'static str,
    },
}

impl ResolverError {
    /// Status code a channel should surface for this error.
    pub fn code(&self) -> Code {
        match self {
            ResolverError::InvalidOperation(_) => Code::FailedPrecondition,
            ResolverError::Disposed => Code::Cancelled,
            ResolverError::InvalidArgument(_) => Code::InvalidArgument,
            ResolverError::NoRuntime => Code::Internal,
            ResolverError::UnsupportedScheme(_) => Code::Unimplemented,
            ResolverError::InvalidTarget { .. } => Code::InvalidArgument,
        }
    }

    pub(crate) fn invalid_target(target: impl Into<String>, reason: &'static str) -> Self {
        ResolverError::InvalidTarget {
            target: target.into(),
            reason,
        }
    }
}

/// Host lookup failures from a [`crate::dns::Resolve`] backend.
#[derive(Debug, Error, Clone)]
pub enum LookupError {
    #[error("Name not resolved")]
    NameNotResolved,
    #[error("Name not resolved for {domain}: {source}")]
    NameNotResolvedFor {
        domain: String,
        #[source]
        source: Arc<io::Error>,
    },
}

impl LookupError {
    pub fn dns_failed(domain: &str, source: io::Error) -> Self {
        LookupError::NameNotResolvedFor {
            domain: domain.to_string(),
            source: Arc::new(source),
        }
    }
}

/// Returned by a strategy that stopped because its resolver was disposed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Default)]
#[error("Resolution cancelled")]
pub struct Cancelled;

/// A strategy panicked while resolving.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Resolver panicked: {0}")]
pub struct ResolvePanic(pub String);

impl ResolvePanic {
    pub(crate) fn from_payload(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        ResolvePanic(message)
    }
}
