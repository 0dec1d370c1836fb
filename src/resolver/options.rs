//! Resolver configuration.

use crate::resolver::sink::{ResolverSink, TracingSink};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, net::IpAddr, sync::Arc, time::Duration};
use tokio::runtime::Handle;

/// Options shared by every resolver a factory builds.
#[derive(Clone)]
pub struct ResolverOptions {
    /// Port used when the target does not name one.
    pub default_port: u16,
    /// Runtime resolution attempts are spawned on. Without one, each refresh
    /// uses the runtime it is called from.
    pub runtime: Option<Handle>,
    /// Receives resolver lifecycle events.
    pub sink: Arc<dyn ResolverSink>,
    /// DNS specific settings.
    pub dns: DnsResolverOptions,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            default_port: 443,
            runtime: None,
            sink: Arc::new(TracingSink),
            dns: DnsResolverOptions::default(),
        }
    }
}

impl ResolverOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default port.
    pub fn default_port(mut self, port: u16) -> Self {
        self.default_port = port;
        self
    }

    /// Spawn resolution attempts on `runtime`.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Report lifecycle events to `sink`.
    pub fn sink(mut self, sink: Arc<dyn ResolverSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Set DNS options.
    pub fn dns(mut self, dns: DnsResolverOptions) -> Self {
        self.dns = dns;
        self
    }
}

impl fmt::Debug for ResolverOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverOptions")
            .field("default_port", &self.default_port)
            .field("runtime", &self.runtime.is_some())
            .field("dns", &self.dns)
            .finish_non_exhaustive()
    }
}

/// DNS resolver settings.
///
/// Deserializable from JSON with durations in milliseconds:
/// `{"refreshIntervalMs": 30000, "minResolutionIntervalMs": 15000}`.
/// Pinned hosts go under `"hosts"`, as `{"name": ["10.0.0.1"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsResolverOptions {
    /// Re-resolve on this period in addition to explicit refreshes.
    #[serde(rename = "refreshIntervalMs", with = "millis_opt")]
    pub refresh_interval: Option<Duration>,
    /// Minimum time between two lookups; a refresh arriving sooner waits.
    #[serde(rename = "minResolutionIntervalMs", with = "millis")]
    pub min_resolution_interval: Duration,
    /// Names answered from this table instead of the lookup backend.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub hosts: HashMap<String, Vec<IpAddr>>,
}

impl Default for DnsResolverOptions {
    fn default() -> Self {
        Self {
            refresh_interval: None,
            min_resolution_interval: Duration::from_secs(15),
            hosts: HashMap::new(),
        }
    }
}

impl DnsResolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the polling period.
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    /// Set the minimum time between lookups.
    pub fn min_resolution_interval(mut self, interval: Duration) -> Self {
        self.min_resolution_interval = interval;
        self
    }

    /// Pin `name` to `ips`, bypassing the backend for it.
    pub fn host(mut self, name: impl Into<String>, ips: Vec<IpAddr>) -> Self {
        self.hosts.insert(name.into(), ips);
        self
    }
}

fn as_millis(duration: &Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(super::as_millis(duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

mod millis_opt {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match duration {
            Some(d) => s.serialize_some(&super::as_millis(d)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(d).map(|ms| ms.map(Duration::from_millis))
    }
}
