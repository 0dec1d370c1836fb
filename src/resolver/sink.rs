//! Observability sink for resolver lifecycle events.
//!
//! The resolver reports four kinds of events: a refresh was requested, a
//! refresh was ignored because an attempt was already running, an attempt
//! failed, and a result was delivered. [`TracingSink`] turns them into
//! `tracing` events; [`NoopSink`] discards them.

use crate::base::Code;
use std::error::Error;

pub trait ResolverSink: Send + Sync {
    fn refresh_requested(&self, resolver: &str);

    fn refresh_ignored(&self, resolver: &str);

    fn refresh_error(&self, resolver: &str, error: &(dyn Error + Send + Sync + 'static));

    fn result_received(&self, resolver: &str, status: Code, address_count: usize);
}

/// Default sink, emitting structured `tracing` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl ResolverSink for TracingSink {
    fn refresh_requested(&self, resolver: &str) {
        tracing::trace!(resolver = %resolver, "resolver refresh requested");
    }

    fn refresh_ignored(&self, resolver: &str) {
        tracing::trace!(resolver = %resolver, "resolver refresh ignored, already resolving");
    }

    fn refresh_error(&self, resolver: &str, error: &(dyn Error + Send + Sync + 'static)) {
        tracing::error!(resolver = %resolver, error = %error, "error refreshing resolver");
    }

    fn result_received(&self, resolver: &str, status: Code, address_count: usize) {
        tracing::debug!(
            resolver = %resolver,
            status = ?status,
            addresses = address_count,
            "resolver result received"
        );
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl ResolverSink for NoopSink {
    fn refresh_requested(&self, _resolver: &str) {}

    fn refresh_ignored(&self, _resolver: &str) {}

    fn refresh_error(&self, _resolver: &str, _error: &(dyn Error + Send + Sync + 'static)) {}

    fn result_received(&self, _resolver: &str, _status: Code, _address_count: usize) {}
}
