//! Resolver strategy backed by a host lookup.
//!
//! Each attempt looks up the target host through a [`Resolve`] backend and
//! delivers the resulting IPs with the target port. IP literal targets skip
//! the lookup entirely.
//!
//! The strategy resolves once when started. Further lookups happen on
//! explicit refreshes and, when configured, on a fixed polling interval.
//! Lookups closer together than `min_resolution_interval` are delayed.

use crate::base::context::StatusResultExt;
use crate::base::Cancelled;
use crate::dns::{HostsResolver, Name, Resolve};
use crate::resolver::{
    address::BalancerAddress,
    lifecycle::{BoxError, ResolveContext, ResolveFuture, ResolveStrategy, ResolverHandle},
    options::DnsResolverOptions,
    result::ResolverResult,
};
use std::{
    fmt,
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::time::{Instant, MissedTickBehavior};

#[derive(Clone)]
pub struct DnsResolver {
    host: Name,
    port: u16,
    backend: Arc<dyn Resolve>,
    options: DnsResolverOptions,
    last_lookup: Arc<Mutex<Option<Instant>>>,
}

impl DnsResolver {
    pub fn new(host: impl Into<Name>, port: u16, backend: Arc<dyn Resolve>) -> Self {
        Self {
            host: host.into(),
            port,
            backend,
            options: DnsResolverOptions::default(),
            last_lookup: Arc::new(Mutex::new(None)),
        }
    }

    /// Apply `options`. A non-empty host table is consulted before the
    /// backend.
    pub fn with_options(mut self, options: DnsResolverOptions) -> Self {
        if !options.hosts.is_empty() {
            let hosts = options.hosts.clone();
            self.backend = Arc::new(HostsResolver::new(hosts, self.backend));
        }
        self.options = options;
        self
    }

    pub fn host(&self) -> &Name {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn spawn_poller(&self, resolver: &ResolverHandle, interval: Duration) {
        let Some(runtime) = resolver.runtime() else {
            tracing::warn!(host = %self.host, "no runtime available, DNS polling disabled");
            return;
        };
        let resolver = resolver.clone();
        let host = self.host.clone();
        runtime.spawn(async move {
            let token = resolver.cancellation_token().clone();
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = resolver.refresh() {
                            tracing::debug!(host = %host, error = %e, "stopping DNS polling");
                            break;
                        }
                    }
                }
            }
        });
    }

    async fn lookup(self, cx: ResolveContext) -> Result<(), BoxError> {
        self.wait_for_min_interval(&cx).await?;

        if let Some(ip) = self.host.ip_literal() {
            let address = BalancerAddress::from(SocketAddr::new(ip, self.port));
            cx.deliver(ResolverResult::for_result(vec![address]));
            return Ok(());
        }

        tracing::debug!(host = %self.host, "starting DNS lookup");
        let lookup = tokio::select! {
            _ = cx.cancelled() => return Err(Cancelled.into()),
            lookup = self.backend.resolve(self.host.clone()) => lookup,
        };

        let detail = format!("Error getting DNS hosts for address '{}'", self.host);
        let result = match lookup.unavailable_context(detail) {
            Ok(ips) => {
                let addresses: Vec<BalancerAddress> = ips
                    .into_iter()
                    .map(|ip| BalancerAddress::from(SocketAddr::new(ip, self.port)))
                    .collect();
                tracing::debug!(host = %self.host, count = addresses.len(), "DNS lookup complete");
                ResolverResult::for_result(addresses)
            }
            Err(status) => {
                tracing::warn!(host = %self.host, error = ?status.cause(), "DNS lookup failed");
                ResolverResult::for_failure(status)?
            }
        };
        cx.deliver(result);
        Ok(())
    }

    async fn wait_for_min_interval(&self, cx: &ResolveContext) -> Result<(), BoxError> {
        let previous = *self.last_lookup();
        if let Some(previous) = previous {
            let next = previous + self.options.min_resolution_interval;
            if next > Instant::now() {
                tracing::debug!(
                    host = %self.host,
                    delay_ms = (next - Instant::now()).as_millis() as u64,
                    "delaying DNS lookup to honor minimum resolution interval"
                );
                tokio::select! {
                    _ = cx.cancelled() => return Err(Cancelled.into()),
                    _ = tokio::time::sleep_until(next) => {}
                }
            }
        }
        *self.last_lookup() = Some(Instant::now());
        Ok(())
    }

    fn last_lookup(&self) -> MutexGuard<'_, Option<Instant>> {
        self.last_lookup
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResolveStrategy for DnsResolver {
    fn on_started(&self, resolver: &ResolverHandle) {
        if let Err(e) = resolver.refresh() {
            tracing::warn!(host = %self.host, error = %e, "DNS resolver could not start");
        }
        if let Some(interval) = self.options.refresh_interval {
            self.spawn_poller(resolver, interval);
        }
    }

    fn resolve(&self, cx: ResolveContext) -> ResolveFuture {
        Box::pin(self.clone().lookup(cx))
    }
}

impl fmt::Debug for DnsResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DnsResolver")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
