//! Proxy module
//!
//! Forwards requests matched by a routing rule to the rule's target. Plain
//! requests go through the pooled [`Forwarder`]; upgrade handshakes on rules
//! that allow them become byte relays.
//!
//! A matched rule never falls through: upstream failures become 502/504.

mod client;
pub mod headers;
pub mod upgrade;

pub use client::Forwarder;
pub use upgrade::{relay, ClosedBy, RelaySummary};

use hyper::body::Incoming;
use hyper::Request;

use crate::http::{build_gateway_error, ProxyResponse};
use crate::logger;
use crate::routing::Rule;

/// Forward a request selected by `rule`
pub async fn forward(req: Request<Incoming>, rule: &Rule, forwarder: &Forwarder) -> ProxyResponse {
    let upgrade = rule.upgrade && headers::is_upgrade_request(&req);
    logger::log_forward(rule, req.method(), req.uri(), upgrade);

    let result = if upgrade {
        upgrade::forward_upgrade(req, rule, forwarder).await
    } else {
        forwarder.forward(req, rule).await
    };

    result.unwrap_or_else(|e| {
        logger::log_proxy_error(&rule.name, &e);
        build_gateway_error(e.status(), &rule.name, &e.to_string())
    })
}
