//! Header manipulation and security headers.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Drop gateway-internal headers before forwarding
//! - Add X-Forwarded-For and X-Forwarded-Host
//! - Add security response headers
//!
//! # Design Decisions
//! - Headers named in `Connection` are hop-by-hop too (RFC 9110 §7.6.1)
//! - `Host` is never forwarded; the client derives it from the target
//! - Existing X-Forwarded-For values are kept and the peer IP appended

use std::net::SocketAddr;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

const SECURITY_HEADERS: [(HeaderName, &str); 3] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::REFERRER_POLICY, "no-referrer"),
];

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

/// Build the header set forwarded to a downstream target.
pub fn forwarded_headers(
    original: &HeaderMap,
    internal_prefix: &str,
    remote_addr: Option<SocketAddr>,
) -> HeaderMap {
    let mut headers = original.clone();
    strip_hop_by_hop(&mut headers);

    let internal: Vec<HeaderName> = headers
        .keys()
        .filter(|name| !internal_prefix.is_empty() && name.as_str().starts_with(internal_prefix))
        .cloned()
        .collect();
    for name in internal {
        headers.remove(&name);
    }

    if let Some(host) = headers.remove(header::HOST) {
        headers.insert(X_FORWARDED_HOST, host);
    }

    if let Some(addr) = remote_addr {
        let ip = addr.ip().to_string();
        let value = match headers.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            Some(existing) => format!("{}, {}", existing, ip),
            None => ip,
        };
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }

    headers
}

/// Add the security response headers that are not already set.
pub fn apply_security_headers(headers: &mut HeaderMap) {
    for (name, value) in SECURITY_HEADERS {
        if !headers.contains_key(&name) {
            headers.insert(name, HeaderValue::from_static(value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, x-trace-hop"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("x-trace-hop", HeaderValue::from_static("1"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

        strip_hop_by_hop(&mut headers);

        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key(header::CONTENT_TYPE));
    }

    #[test]
    fn test_forwarded_headers() {
        let mut original = HeaderMap::new();
        original.insert(header::HOST, HeaderValue::from_static("gateway.local"));
        original.insert("x-gateway-internal-user", HeaderValue::from_static("42"));
        original.insert(X_FORWARDED_FOR, HeaderValue::from_static("10.0.0.1"));
        original.append(header::ACCEPT, HeaderValue::from_static("text/html"));
        original.append(header::ACCEPT, HeaderValue::from_static("application/json"));

        let remote: SocketAddr = "192.168.1.7:51000".parse().unwrap();
        let headers = forwarded_headers(&original, "x-gateway-internal-", Some(remote));

        assert!(headers.get(header::HOST).is_none());
        assert!(headers.get("x-gateway-internal-user").is_none());
        assert_eq!(headers.get(X_FORWARDED_HOST).unwrap(), "gateway.local");
        assert_eq!(headers.get(X_FORWARDED_FOR).unwrap(), "10.0.0.1, 192.168.1.7");
        assert_eq!(headers.get_all(header::ACCEPT).iter().count(), 2);
    }

    #[test]
    fn test_security_headers_keep_existing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));

        apply_security_headers(&mut headers);

        assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "SAMEORIGIN");
        assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
        assert_eq!(headers.get(header::REFERRER_POLICY).unwrap(), "no-referrer");
    }
}
