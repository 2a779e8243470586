//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Login and registration submissions are throttled per client IP (~10/min).
//! The client IP is the TCP peer unless `TRUST_PROXY_HEADERS` is set.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Key extractor keyed on the peer address of the TCP connection.
///
/// With `trust_proxy_headers` set, the usual reverse proxy headers win over
/// the peer address. Clients can forge them, so this is only enabled behind
/// a proxy that overwrites them.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor {
    pub trust_proxy_headers: bool,
}

fn header_ip<T>(req: &Request<T>, name: &str) -> Option<IpAddr> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        // The first X-Forwarded-For entry is the client
        let forwarded = || {
            ["x-forwarded-for", "x-real-ip"]
                .iter()
                .find_map(|name| header_ip(req, name))
        };

        self.trust_proxy_headers
            .then(forwarded)
            .flatten()
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
/// This slows down password guessing on login and account spam on
/// registration.
///
/// `trust_proxy_headers` comes from `TRUST_PROXY_HEADERS`.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(6)` and `burst_size(5)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter(trust_proxy_headers: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor {
            trust_proxy_headers,
        })
        .per_second(6) // Replenish 1 token every 6 seconds (~10/minute)
        .burst_size(5) // Allow burst of 5 requests
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    const BEHIND_PROXY: ClientIpKeyExtractor = ClientIpKeyExtractor {
        trust_proxy_headers: true,
    };
    const DIRECT: ClientIpKeyExtractor = ClientIpKeyExtractor {
        trust_proxy_headers: false,
    };

    fn request_from(peer: &str, forwarded_for: Option<&str>) -> Request<()> {
        let mut builder = Request::builder();
        if let Some(value) = forwarded_for {
            builder = builder.header("x-forwarded-for", value);
        }
        let mut req = builder.body(()).unwrap();
        let peer: SocketAddr = peer.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(peer));
        req
    }

    #[test]
    fn test_forwarded_for_takes_first_hop_behind_proxy() {
        let req = request_from("10.0.0.1:40000", Some("203.0.113.9, 10.0.0.1"));
        assert_eq!(
            BEHIND_PROXY.extract(&req).unwrap(),
            "203.0.113.9".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_forged_headers_ignored_by_default() {
        let peer = "192.0.2.4:51000";
        for forged in ["198.51.100.1", "198.51.100.2"] {
            let mut req = request_from(peer, Some(forged));
            req.headers_mut().insert("x-real-ip", forged.parse().unwrap());
            assert_eq!(
                DIRECT.extract(&req).unwrap(),
                "192.0.2.4".parse::<IpAddr>().unwrap()
            );
        }
    }

    #[test]
    fn test_falls_back_to_peer_address() {
        let req = request_from("192.0.2.4:51000", None);
        assert_eq!(
            BEHIND_PROXY.extract(&req).unwrap(),
            "192.0.2.4".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_no_source_is_an_error() {
        let req = Request::builder().body(()).unwrap();
        assert!(DIRECT.extract(&req).is_err());
        assert!(BEHIND_PROXY.extract(&req).is_err());
    }
}
