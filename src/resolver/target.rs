//! Target string helpers shared by resolver factories.

use crate::base::ResolverError;
use url::Url;

/// The resolver-specific part of a target URL: the path without its leading
/// slash, so `dns:///example.com:50051` yields `example.com:50051`.
///
/// Targets written without an empty authority (`dns:example.com:50051`) are
/// accepted too.
pub fn endpoint(target: &Url) -> &str {
    target.path().trim_start_matches('/')
}

/// Split `host[:port]` into its parts, using `default_port` when absent.
///
/// IPv6 literals must be bracketed to carry a port (`[::1]:443`); an
/// unbracketed IPv6 literal is taken as a host with the default port.
pub fn parse_host_port(endpoint: &str, default_port: u16) -> Result<(String, u16), ResolverError> {
    if endpoint.is_empty() {
        return Err(ResolverError::invalid_target(endpoint, "missing host"));
    }

    if let Some(rest) = endpoint.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| ResolverError::invalid_target(endpoint, "unterminated IPv6 literal"))?;
        let port = match tail {
            "" => default_port,
            tail => parse_port(endpoint, tail.strip_prefix(':'))?,
        };
        return Ok((host.to_string(), port));
    }

    match endpoint.matches(':').count() {
        0 => Ok((endpoint.to_string(), default_port)),
        1 => {
            let (host, port) = endpoint.split_once(':').unwrap_or((endpoint, ""));
            if host.is_empty() {
                return Err(ResolverError::invalid_target(endpoint, "missing host"));
            }
            Ok((host.to_string(), parse_port(endpoint, Some(port))?))
        }
        _ => Ok((endpoint.to_string(), default_port)),
    }
}

fn parse_port(endpoint: &str, port: Option<&str>) -> Result<u16, ResolverError> {
    port.filter(|p| !p.is_empty())
        .and_then(|p| p.parse::<u16>().ok())
        .ok_or_else(|| ResolverError::invalid_target(endpoint, "invalid port"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_slash() {
        let url = Url::parse("dns:///example.com:50051").unwrap();
        assert_eq!(endpoint(&url), "example.com:50051");

        let url = Url::parse("dns://8.8.8.8/example.com").unwrap();
        assert_eq!(endpoint(&url), "example.com");
    }

    #[test]
    fn test_host_and_port() {
        assert_eq!(
            parse_host_port("example.com:50051", 443).unwrap(),
            ("example.com".into(), 50051)
        );
        assert_eq!(parse_host_port("example.com", 443).unwrap(), ("example.com".into(), 443));
    }

    #[test]
    fn test_ipv6() {
        assert_eq!(parse_host_port("[::1]:8080", 443).unwrap(), ("::1".into(), 8080));
        assert_eq!(parse_host_port("[::1]", 443).unwrap(), ("::1".into(), 443));
        assert_eq!(parse_host_port("fe80::1", 80).unwrap(), ("fe80::1".into(), 80));
    }

    #[test]
    fn test_invalid() {
        assert!(parse_host_port("", 80).is_err());
        assert!(parse_host_port(":80", 80).is_err());
        assert!(parse_host_port("host:", 80).is_err());
        assert!(parse_host_port("host:http", 80).is_err());
        assert!(parse_host_port("[::1", 80).is_err());
        assert!(parse_host_port("[::1]x", 80).is_err());
    }
}
