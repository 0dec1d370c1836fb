//! DNS Module Tests
//!
//! Covers:
//! - `Name` canonical form
//! - `HostsResolver` in front of a MockResolver
//! - `GaiResolver` (Basic System Resolver)
//! - `DnsResolver` strategy: lookups, failures, cancellation, pacing, polling
//! - Pinned hosts from `DnsResolverOptions`

use rpcresolve::base::{Code, LookupError};
use rpcresolve::dns::{GaiResolver, HostsResolver, Lookup, Name, Resolve};
use rpcresolve::resolver::{
    DnsResolver, DnsResolverFactory, DnsResolverOptions, Resolver, ResolverFactory,
    ResolverOptions, ResolverResult,
};

use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};
use url::Url;

struct MockResolver {
    response: Vec<IpAddr>,
    calls: AtomicUsize,
}

impl MockResolver {
    fn new(ips: &[[u8; 4]]) -> Arc<Self> {
        let response = ips.iter().map(|ip| IpAddr::V4(Ipv4Addr::from(*ip))).collect();
        Arc::new(Self {
            response,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Resolve for MockResolver {
    fn resolve(&self, _name: Name) -> Lookup {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let ips = self.response.clone();
        Box::pin(async move { Ok(ips) })
    }
}

struct FailingResolver;

impl Resolve for FailingResolver {
    fn resolve(&self, name: Name) -> Lookup {
        let err = LookupError::dns_failed(name.as_str(), io::Error::other("SERVFAIL"));
        Box::pin(async move { Err(err) })
    }
}

struct HangingResolver;

impl Resolve for HangingResolver {
    fn resolve(&self, _name: Name) -> Lookup {
        Box::pin(std::future::pending())
    }
}

fn start(resolver: &Resolver) -> mpsc::UnboundedReceiver<ResolverResult> {
    let (tx, rx) = mpsc::unbounded_channel();
    resolver
        .start(move |result| {
            let _ = tx.send(result);
        })
        .unwrap();
    rx
}

fn no_pacing() -> ResolverOptions {
    let dns = DnsResolverOptions::new().min_resolution_interval(Duration::ZERO);
    ResolverOptions::new().dns(dns)
}

fn loopback() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

#[test]
fn test_name_api() {
    let name = Name::new("Example.COM.");
    assert_eq!(name.as_str(), "example.com");
    assert_eq!(name.to_string(), "example.com");
    assert_eq!(name, Name::from("example.com"));
    assert!(name.ip_literal().is_none());
    assert_eq!(Name::new("::1").ip_literal(), Some("::1".parse().unwrap()));
}

#[tokio::test]
async fn test_hosts_table() {
    let mock = MockResolver::new(&[[8, 8, 8, 8]]);
    let resolver = HostsResolver::new([("local.override", vec![loopback()])], mock.clone());

    // Table hit
    let ips = resolver.resolve(Name::new("local.override")).await.unwrap();
    assert_eq!(ips, vec![loopback()]);
    assert_eq!(mock.calls(), 0);

    // Passthrough (miss)
    let ips = resolver.resolve(Name::new("other.com")).await.unwrap();
    assert_eq!(ips, vec![IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8))]);
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn test_gai_resolver_localhost() {
    let resolver = GaiResolver::new();
    // localhost should always resolve, usually to 127.0.0.1 or ::1
    let result = resolver.resolve(Name::new("localhost")).await;

    if let Ok(ips) = result {
        assert!(!ips.is_empty());
    } else {
        println!("GaiResolver failed for localhost - possibly no network access");
    }
}

#[tokio::test]
async fn test_lookup_delivers_addresses_with_target_port() {
    let backend = MockResolver::new(&[[10, 0, 0, 1], [10, 0, 0, 2]]);
    let strategy = DnsResolver::new("greeter.internal", 50051, backend.clone());
    let resolver = Resolver::with_options(strategy, &no_pacing());

    // Started resolvers look up once without an explicit refresh.
    let mut rx = start(&resolver);
    let result = rx.recv().await.unwrap();

    assert!(result.is_ok());
    let addresses = result.addresses().unwrap();
    assert_eq!(addresses.len(), 2);
    assert_eq!(addresses[0].host(), "10.0.0.1");
    assert!(addresses.iter().all(|a| a.port() == 50051));
    assert!(result.service_config().is_none());
    assert_eq!(backend.calls(), 1);

    resolver.dispose();
}

#[tokio::test]
async fn test_lookup_failure_is_unavailable() {
    let strategy = DnsResolver::new("down.internal", 443, Arc::new(FailingResolver));
    let resolver = Resolver::new(strategy);
    let mut rx = start(&resolver);

    let result = rx.recv().await.unwrap();
    assert_eq!(result.status().code(), Code::Unavailable);
    assert_eq!(
        result.status().detail(),
        "Error getting DNS hosts for address 'down.internal'"
    );
    assert!(result.status().cause().unwrap().to_string().contains("SERVFAIL"));
    assert!(result.addresses().is_none());
}

#[tokio::test]
async fn test_ip_literal_skips_lookup() {
    let backend = MockResolver::new(&[[8, 8, 8, 8]]);
    let resolver = Resolver::new(DnsResolver::new("10.1.2.3", 8080, backend.clone()));
    let mut rx = start(&resolver);

    let result = rx.recv().await.unwrap();
    let addresses = result.addresses().unwrap();
    assert_eq!(addresses.len(), 1);
    assert_eq!(addresses[0].host(), "10.1.2.3");
    assert_eq!(addresses[0].port(), 8080);
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_dispose_cancels_pending_lookup() {
    let strategy = DnsResolver::new("slow.internal", 443, Arc::new(HangingResolver));
    let resolver = Resolver::new(strategy);
    let mut rx = start(&resolver);

    tokio::task::yield_now().await;
    resolver.dispose();

    let outcome = timeout(Duration::from_millis(50), rx.recv()).await;
    assert!(!matches!(outcome, Ok(Some(_))), "no result after dispose");
}

#[tokio::test(start_paused = true)]
async fn test_min_resolution_interval_delays_lookups() {
    let backend = MockResolver::new(&[[10, 0, 0, 1]]);
    let options = DnsResolverOptions::new().min_resolution_interval(Duration::from_secs(15));
    let strategy =
        DnsResolver::new("greeter.internal", 443, backend.clone()).with_options(options);
    let resolver = Resolver::new(strategy);

    let begin = Instant::now();
    let mut rx = start(&resolver);
    rx.recv().await.unwrap();
    assert!(begin.elapsed() < Duration::from_secs(1));

    resolver.refresh().unwrap();
    rx.recv().await.unwrap();
    assert!(begin.elapsed() >= Duration::from_secs(15));
    assert_eq!(backend.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_interval_polls() {
    let backend = MockResolver::new(&[[10, 0, 0, 1]]);
    let options = DnsResolverOptions::new()
        .refresh_interval(Duration::from_secs(30))
        .min_resolution_interval(Duration::ZERO);
    let strategy =
        DnsResolver::new("greeter.internal", 443, backend.clone()).with_options(options);
    let resolver = Resolver::new(strategy);

    let begin = Instant::now();
    let mut rx = start(&resolver);
    rx.recv().await.unwrap();
    rx.recv().await.unwrap();
    assert!(begin.elapsed() >= Duration::from_secs(30));
    assert_eq!(backend.calls(), 2);

    resolver.dispose();
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn test_factory_applies_default_port() {
    let backend = MockResolver::new(&[[10, 0, 0, 9]]);
    let factory = DnsResolverFactory::new(backend);
    let target = Url::parse("dns:///greeter.internal").unwrap();
    let resolver = factory.create(&target, &no_pacing().default_port(50051)).unwrap();

    let mut rx = start(&resolver);
    let result = rx.recv().await.unwrap();
    assert_eq!(result.addresses().unwrap()[0].port(), 50051);
}

#[tokio::test]
async fn test_pinned_hosts_bypass_backend() {
    let backend = MockResolver::new(&[[10, 0, 0, 9]]);
    let factory = DnsResolverFactory::new(backend.clone());
    let dns = DnsResolverOptions::new()
        .min_resolution_interval(Duration::ZERO)
        .host("Pinned.Internal", vec![loopback()]);
    let options = ResolverOptions::new().dns(dns);

    let pinned = Url::parse("dns:///pinned.internal:8443").unwrap();
    let resolver = factory.create(&pinned, &options).unwrap();
    let mut rx = start(&resolver);
    let result = rx.recv().await.unwrap();
    let addresses = result.addresses().unwrap();
    assert_eq!(addresses.len(), 1);
    assert_eq!(addresses[0].host(), "127.0.0.1");
    assert_eq!(addresses[0].port(), 8443);
    assert_eq!(backend.calls(), 0);

    let other = Url::parse("dns:///other.internal").unwrap();
    let resolver = factory.create(&other, &options).unwrap();
    let mut rx = start(&resolver);
    let result = rx.recv().await.unwrap();
    assert_eq!(result.addresses().unwrap()[0].host(), "10.0.0.9");
    assert_eq!(backend.calls(), 1);
}
