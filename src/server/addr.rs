//! server::addr
//!
//! Client-address derivation for rate limiting.
//!
//! # Design
//!
//! The limiter needs a stable per-client key. By default that is the peer
//! socket address. Behind a reverse proxy every peer is the proxy itself,
//! so deployments set `FORGELINK_FORWARDED` and the last hop of the
//! `X-Forwarded-For` chain is used instead. The header is attacker
//! controlled when no trusted proxy overwrites it, hence the opt-in.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::header::HeaderMap;
use axum::http::Extensions;

/// Fallback identity when neither a socket address nor a usable forwarded
/// header is available (e.g. in-process test requests). All such requests
/// share one rate-limit window.
const UNKNOWN_CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Derive the client identity for a request.
pub fn client_ip(headers: &HeaderMap, extensions: &Extensions, trust_forwarded: bool) -> IpAddr {
    if trust_forwarded {
        if let Some(ip) = forwarded_ip(headers) {
            return ip;
        }
    }
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(peer)| peer.ip())
        .unwrap_or(UNKNOWN_CLIENT)
}

/// The last address of the `X-Forwarded-For` chain, if parseable.
fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .map(str::trim)
        .next_back()?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_xff(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", value.parse().unwrap());
        headers
    }

    #[test]
    fn forwarded_takes_last_hop() {
        let headers = headers_with_xff("203.0.113.7, 10.0.0.1, 192.0.2.33");
        assert_eq!(
            forwarded_ip(&headers),
            Some("192.0.2.33".parse::<IpAddr>().unwrap())
        );
    }

    #[test]
    fn forwarded_single_entry() {
        let headers = headers_with_xff("203.0.113.7");
        assert_eq!(
            forwarded_ip(&headers),
            Some("203.0.113.7".parse::<IpAddr>().unwrap())
        );
    }

    #[test]
    fn forwarded_garbage_is_ignored() {
        assert_eq!(forwarded_ip(&headers_with_xff("not-an-ip")), None);
        assert_eq!(forwarded_ip(&headers_with_xff("")), None);
    }

    #[test]
    fn untrusted_header_is_not_consulted() {
        let headers = headers_with_xff("203.0.113.7");
        let extensions = Extensions::new();
        assert_eq!(client_ip(&headers, &extensions, false), UNKNOWN_CLIENT);
    }

    #[test]
    fn trusted_header_wins_over_socket_address() {
        let headers = headers_with_xff("203.0.113.7");
        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo::<SocketAddr>("10.1.1.1:9999".parse().unwrap()));
        assert_eq!(
            client_ip(&headers, &extensions, true),
            "203.0.113.7".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn socket_address_used_without_header() {
        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo::<SocketAddr>("10.1.1.1:9999".parse().unwrap()));
        assert_eq!(
            client_ip(&HeaderMap::new(), &extensions, true),
            "10.1.1.1".parse::<IpAddr>().unwrap()
        );
    }
}
