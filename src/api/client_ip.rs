//! Originating client address behind the reverse proxy.
//!
//! Headers are trusted as-is: the process binds to loopback, so only the proxy
//! can reach it.

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use std::{convert::Infallible, net::SocketAddr};

pub const UNKNOWN_CLIENT: &str = "unknown";

/// First `X-Forwarded-For` entry, then `X-Real-IP`, then the transport peer.
#[must_use]
pub fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(forwarded) = forwarded {
        return forwarded.to_string();
    }

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(real_ip) = real_ip {
        return real_ip.to_string();
    }

    peer.map_or_else(|| UNKNOWN_CLIENT.to_string(), |addr| addr.ip().to_string())
}

/// Extractor for the resolved client address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientIp(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let peer = ConnectInfo::<SocketAddr>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|ConnectInfo(addr)| addr);
        Ok(Self(resolve(&parts.headers, peer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    fn peer() -> Option<SocketAddr> {
        Some(SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 51234))
    }

    #[test]
    fn forwarded_for_takes_first_entry() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.2.3.4, 5.6.7.8"));
        headers.insert("x-real-ip", HeaderValue::from_static("9.9.9.9"));
        assert_eq!(resolve(&headers, peer()), "1.2.3.4");
    }

    #[test]
    fn forwarded_for_is_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("  10.0.0.1 ,10.0.0.2"));
        assert_eq!(resolve(&headers, peer()), "10.0.0.1");
    }

    #[test]
    fn real_ip_when_no_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("9.9.9.9"));
        assert_eq!(resolve(&headers, peer()), "9.9.9.9");
    }

    #[test]
    fn empty_headers_fall_through() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" "));
        headers.insert("x-real-ip", HeaderValue::from_static(""));
        assert_eq!(resolve(&headers, peer()), "127.0.0.1");
    }

    #[test]
    fn peer_address_without_port() {
        let v6 = SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 8080);
        assert_eq!(resolve(&HeaderMap::new(), Some(v6)), "::1");
        assert_eq!(resolve(&HeaderMap::new(), None), UNKNOWN_CLIENT);
    }
}
