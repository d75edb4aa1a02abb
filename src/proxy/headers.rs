//! Header handling for forwarded traffic
//!
//! Hop-by-hop headers describe one connection and are never forwarded. The
//! identity headers (`Host`, `Origin`) are rewritten only when a rule asks
//! for an origin change.

use hyper::header::{
    HeaderMap, HeaderName, HeaderValue, CONNECTION, HOST, ORIGIN, TE, TRAILER, TRANSFER_ENCODING,
    UPGRADE,
};
use hyper::Request;

use crate::routing::Target;

const KEEP_ALIVE: HeaderName = HeaderName::from_static("keep-alive");
const PROXY_CONNECTION: HeaderName = HeaderName::from_static("proxy-connection");

/// Whether the request asks to switch protocols (`Connection: upgrade` + `Upgrade`)
#[must_use]
pub fn is_upgrade_request<B>(req: &Request<B>) -> bool {
    req.headers().contains_key(UPGRADE) && connection_has_token(req.headers(), "upgrade")
}

fn connection_has_token(headers: &HeaderMap, token: &str) -> bool {
    headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|t| t.trim().eq_ignore_ascii_case(token))
}

/// Remove hop-by-hop headers, including any named in `Connection`
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|t| HeaderName::from_bytes(t.trim().as_bytes()).ok())
        .collect();
    for name in listed {
        headers.remove(name);
    }

    for name in [
        CONNECTION,
        KEEP_ALIVE,
        PROXY_CONNECTION,
        TE,
        TRAILER,
        TRANSFER_ENCODING,
        UPGRADE,
    ] {
        headers.remove(name);
    }
}

/// Hop-by-hop stripping that keeps the upgrade negotiation intact
pub fn prepare_upgrade_headers(headers: &mut HeaderMap) {
    let protocol = headers.get(UPGRADE).cloned();
    strip_hop_by_hop(headers);
    if let Some(protocol) = protocol {
        headers.insert(CONNECTION, HeaderValue::from_static("upgrade"));
        headers.insert(UPGRADE, protocol);
    }
}

/// Apply the rule's origin policy to the outgoing identity headers.
///
/// Without an origin change the client-facing `Host` is kept and only filled
/// in from the target when the client sent none.
pub fn apply_origin(headers: &mut HeaderMap, target: &Target, change_origin: bool) {
    let authority = HeaderValue::from_str(target.authority.as_str());

    if change_origin {
        if let Ok(host) = authority {
            headers.insert(HOST, host);
        }
        if headers.contains_key(ORIGIN) {
            if let Ok(origin) = HeaderValue::from_str(&target.origin()) {
                headers.insert(ORIGIN, origin);
            }
        }
    } else if !headers.contains_key(HOST) {
        if let Ok(host) = authority {
            headers.insert(HOST, host);
        }
    }
}
