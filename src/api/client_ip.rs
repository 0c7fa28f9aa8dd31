use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Headers consulted for the client address, highest precedence first.
/// The flag marks headers that may carry a comma-separated proxy chain.
const CLIENT_IP_HEADERS: [(&str, bool); 5] = [
    ("x-forwarded-for", true),
    ("proxy-client-ip", false),
    ("wl-proxy-client-ip", false),
    ("http_client_ip", false),
    ("http_x_forwarded_for", true),
];

/// A header value that is blank or the `unknown` placeholder counts as absent.
fn usable(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("unknown") {
        None
    } else {
        Some(value)
    }
}

/// Pick the candidate client address string for a request.
///
/// The result is not validated; it falls back to the transport peer address
/// when no header yields a usable value.
pub fn resolve_client_address(headers: &HeaderMap, remote: SocketAddr) -> String {
    for (name, is_chain) in CLIENT_IP_HEADERS {
        let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) else {
            continue;
        };
        let candidate = if is_chain {
            // The left-most hop is the originating client.
            value.split(',').next().unwrap_or(value).trim()
        } else {
            value
        };
        let Some(candidate) = usable(candidate) else {
            continue;
        };
        tracing::debug!("Client address {:?} from header {}", candidate, name);
        return candidate.to_string();
    }

    remote.ip().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};

    fn remote() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 40000))
    }

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_falls_back_to_remote() {
        assert_eq!(resolve_client_address(&HeaderMap::new(), remote()), "127.0.0.1");
    }

    #[test]
    fn test_each_header_is_honoured() {
        for name in [
            "X-Forwarded-For",
            "Proxy-Client-IP",
            "WL-Proxy-Client-IP",
            "HTTP_CLIENT_IP",
            "HTTP_X_FORWARDED_FOR",
        ] {
            let map = headers(&[(name, "3.3.3.3")]);
            assert_eq!(resolve_client_address(&map, remote()), "3.3.3.3", "{name}");
        }
    }

    #[test]
    fn test_blank_and_unknown_fall_through() {
        for placeholder in ["", "   ", "unknown", "UNKNOWN", "Unknown"] {
            let map = headers(&[("X-Forwarded-For", placeholder)]);
            assert_eq!(resolve_client_address(&map, remote()), "127.0.0.1", "{placeholder:?}");

            let map = headers(&[("X-Forwarded-For", placeholder), ("WL-Proxy-Client-IP", "4.4.4.4")]);
            assert_eq!(resolve_client_address(&map, remote()), "4.4.4.4");
        }
    }

    #[test]
    fn test_placeholder_first_hop_falls_through() {
        let map = headers(&[("X-Forwarded-For", "unknown, 3.3.3.3"), ("Proxy-Client-IP", "4.4.4.4")]);
        assert_eq!(resolve_client_address(&map, remote()), "4.4.4.4");

        let map = headers(&[("X-Forwarded-For", " , 3.3.3.3")]);
        assert_eq!(resolve_client_address(&map, remote()), "127.0.0.1");

        let map = headers(&[("HTTP_X_FORWARDED_FOR", "Unknown,5.5.5.5")]);
        assert_eq!(resolve_client_address(&map, remote()), "127.0.0.1");
    }

    #[test]
    fn test_precedence() {
        let map = headers(&[
            ("HTTP_X_FORWARDED_FOR", "5.5.5.5"),
            ("Proxy-Client-IP", "4.4.4.4"),
            ("X-Forwarded-For", "3.3.3.3"),
        ]);
        assert_eq!(resolve_client_address(&map, remote()), "3.3.3.3");
    }

    #[test]
    fn test_forwarded_chain_uses_first_hop() {
        let map = headers(&[("X-Forwarded-For", "3.3.3.3, 10.0.0.1, 10.0.0.2")]);
        assert_eq!(resolve_client_address(&map, remote()), "3.3.3.3");
    }

    #[test]
    fn test_value_is_not_validated() {
        let map = headers(&[("Proxy-Client-IP", "not-an-ip")]);
        assert_eq!(resolve_client_address(&map, remote()), "not-an-ip");
    }
}
