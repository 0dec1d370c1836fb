//! Registry and static resolver tests.
//!
//! Covers:
//! - Building resolvers from target URLs
//! - Static resolution with and without service config
//! - Custom factory registration

use rpcresolve::base::{Code, ResolverError};
use rpcresolve::resolver::{
    BalancerAddress, Resolver, ResolverFactory, ResolverOptions, ResolverRegistry,
    ResolverResult, StaticResolver, StaticResolverFactory,
};

use std::sync::Arc;
use tokio::sync::mpsc;
use url::Url;

fn start(resolver: &Resolver) -> mpsc::UnboundedReceiver<ResolverResult> {
    let (tx, rx) = mpsc::unbounded_channel();
    resolver
        .start(move |result| {
            let _ = tx.send(result);
        })
        .unwrap();
    rx
}

#[tokio::test]
async fn test_static_target_end_to_end() {
    let registry = ResolverRegistry::with_defaults();
    let options = ResolverOptions::new().default_port(50051);
    let resolver = registry.create_for("static:///10.0.0.1:8080,10.0.0.2", &options).unwrap();

    let mut rx = start(&resolver);
    let result = rx.recv().await.unwrap();
    assert!(result.is_ok());
    assert_eq!(
        result.addresses().unwrap(),
        &[BalancerAddress::new("10.0.0.1", 8080), BalancerAddress::new("10.0.0.2", 50051)]
    );

    // Explicit refreshes deliver the same list again.
    resolver.refresh().unwrap();
    let again = rx.recv().await.unwrap();
    assert_eq!(again.addresses(), result.addresses());
    resolver.dispose();
}

#[tokio::test]
async fn test_static_ipv6_target() {
    let registry = ResolverRegistry::with_defaults();
    let resolver =
        registry.create_for("static:///[::1]:9000", &ResolverOptions::default()).unwrap();

    let mut rx = start(&resolver);
    let result = rx.recv().await.unwrap();
    let address = &result.addresses().unwrap()[0];
    assert_eq!(address.host(), "::1");
    assert_eq!(address.port(), 9000);
    assert_eq!(address.to_string(), "[::1]:9000");
}

#[tokio::test]
async fn test_static_service_config_delivered() {
    let strategy = StaticResolver::new(vec![BalancerAddress::new("10.0.0.1", 443)])
        .with_service_config_json(
            r#"{
                "loadBalancingConfig": [{"round_robin": {}}],
                "methodConfig": [{"name": [{"service": "greet.Greeter"}], "timeout": "1.5s"}]
            }"#,
        );
    let resolver = Resolver::new(strategy);
    let mut rx = start(&resolver);

    let result = rx.recv().await.unwrap();
    let config = result.service_config().unwrap();
    assert_eq!(config.load_balancing_policy(), Some("round_robin"));
    assert!(config.method("greet.Greeter", "SayHello").is_some());
    assert!(result.service_config_status().is_none());
}

#[tokio::test]
async fn test_static_bad_service_config_still_resolves() {
    let strategy = StaticResolver::new(vec![BalancerAddress::new("10.0.0.1", 443)])
        .with_service_config_json("{not json");
    let resolver = Resolver::new(strategy);
    let mut rx = start(&resolver);

    let result = rx.recv().await.unwrap();
    assert!(result.is_ok());
    assert_eq!(result.address_count(), 1);
    assert!(result.service_config().is_none());
    assert_eq!(result.service_config_status().unwrap().code(), Code::InvalidArgument);
}

#[test]
fn test_unsupported_scheme() {
    let registry = ResolverRegistry::with_defaults();
    let err = registry.create_for("xds:///greeter", &ResolverOptions::default()).unwrap_err();
    assert_eq!(err, ResolverError::UnsupportedScheme("xds".to_string()));
    assert_eq!(err.code(), Code::Unimplemented);
}

#[test]
fn test_invalid_static_target() {
    let registry = ResolverRegistry::with_defaults();
    let err = registry
        .create_for("static:///10.0.0.1:notaport", &ResolverOptions::default())
        .unwrap_err();
    assert!(matches!(err, ResolverError::InvalidTarget { .. }));
}

struct PinnedFactory;

impl ResolverFactory for PinnedFactory {
    fn scheme(&self) -> &str {
        "pinned"
    }

    fn create(&self, _target: &Url, options: &ResolverOptions) -> Result<Resolver, ResolverError> {
        StaticResolverFactory::with_addresses(vec![BalancerAddress::new("192.0.2.10", 7000)])
            .create(&Url::parse("static:///").unwrap(), options)
    }
}

#[tokio::test]
async fn test_custom_factory() {
    let registry = ResolverRegistry::new();
    registry.register(Arc::new(PinnedFactory));
    assert_eq!(registry.schemes(), vec!["pinned".to_string()]);

    let resolver = registry.create_for("pinned:///anything", &ResolverOptions::default()).unwrap();
    let mut rx = start(&resolver);
    let result = rx.recv().await.unwrap();
    assert_eq!(result.addresses().unwrap(), &[BalancerAddress::new("192.0.2.10", 7000)]);
}
