//! Client identity for quota purposes.
//!
//! # Resolution Order
//! 1. First entry of `X-Forwarded-For` (when trusted)
//! 2. Connection peer address
//! 3. The literal `"unknown"`
//!
//! Clients that share an address share a quota. That over-throttles NATed
//! users and everyone who ends up on `"unknown"`, which is accepted.

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;

use crate::config::RateLimitConfig;

/// Header carrying the proxy chain, originating client first.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Identity used when no address information is available.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Derive a namespaced client key. Never fails.
pub fn derive_key(prefix: &str, forwarded_for: Option<&str>, remote_addr: Option<IpAddr>) -> String {
    let forwarded = forwarded_for
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|client| !client.is_empty());

    match (forwarded, remote_addr) {
        (Some(client), _) => namespaced(prefix, client),
        (None, Some(ip)) => namespaced(prefix, &ip.to_string()),
        (None, None) => namespaced(prefix, UNKNOWN_CLIENT),
    }
}

/// Prefix a raw client identity with the key namespace.
pub fn namespaced(prefix: &str, client: &str) -> String {
    format!("{prefix}{client}")
}

/// Derive the key for an inbound request.
pub fn key_for_request(
    headers: &HeaderMap,
    remote_addr: Option<SocketAddr>,
    config: &RateLimitConfig,
) -> String {
    let forwarded = if config.trust_forwarded_for {
        headers
            .get(X_FORWARDED_FOR)
            .and_then(|value| value.to_str().ok())
    } else {
        None
    };

    derive_key(&config.key_prefix, forwarded, remote_addr.map(|addr| addr.ip()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const PREFIX: &str = "rate_limit:";

    #[test]
    fn test_first_forwarded_entry_wins() {
        let remote: IpAddr = "10.0.0.1".parse().unwrap();
        assert_eq!(
            derive_key(PREFIX, Some("1.2.3.4, 5.6.7.8"), Some(remote)),
            "rate_limit:1.2.3.4"
        );
        assert_eq!(
            derive_key(PREFIX, Some("1.2.3.4,9.9.9.9,8.8.8.8"), None),
            "rate_limit:1.2.3.4"
        );
    }

    #[test]
    fn test_falls_back_to_remote_address() {
        let remote: IpAddr = "192.168.1.20".parse().unwrap();
        assert_eq!(derive_key(PREFIX, None, Some(remote)), "rate_limit:192.168.1.20");
        // Empty or blank first entries carry no identity.
        assert_eq!(derive_key(PREFIX, Some(""), Some(remote)), "rate_limit:192.168.1.20");
        assert_eq!(
            derive_key(PREFIX, Some(" , 1.2.3.4"), Some(remote)),
            "rate_limit:192.168.1.20"
        );
    }

    #[test]
    fn test_unknown_fallback_is_deterministic() {
        assert_eq!(derive_key(PREFIX, None, None), "rate_limit:unknown");
        assert_eq!(derive_key(PREFIX, None, None), derive_key(PREFIX, Some("  "), None));
    }

    #[test]
    fn test_ipv6_remote() {
        let remote: IpAddr = "::1".parse().unwrap();
        assert_eq!(derive_key(PREFIX, None, Some(remote)), "rate_limit:::1");
    }

    #[test]
    fn test_request_key_respects_trust_setting() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("203.0.113.7, 10.0.0.2"));
        let remote: SocketAddr = "127.0.0.1:50000".parse().unwrap();

        let mut config = RateLimitConfig::default();
        assert_eq!(
            key_for_request(&headers, Some(remote), &config),
            "rate_limit:203.0.113.7"
        );

        config.trust_forwarded_for = false;
        assert_eq!(
            key_for_request(&headers, Some(remote), &config),
            "rate_limit:127.0.0.1"
        );
    }
}
