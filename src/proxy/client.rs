//! Plain request forwarding
//!
//! Uses a pooled HTTP/1 client so repeated requests to the backend reuse
//! connections. The upstream body is streamed back without buffering.

use std::error::Error as StdError;
use std::time::Duration;

use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::http::uri::PathAndQuery;
use hyper::{Request, Response, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tokio::time::timeout;

use super::headers::{apply_origin, strip_hop_by_hop};
use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::ProxyResponse;
use crate::routing::{rewrite_path_and_query, Rule, Target};

/// Upstream client shared by all connections
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Incoming>,
    pub(crate) connect_timeout: Duration,
    pub(crate) response_timeout: Duration,
}

impl Forwarder {
    #[must_use]
    pub fn new(config: &ProxyConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(config.connect_timeout()));
        connector.set_nodelay(true);

        Self {
            client: Client::builder(TokioExecutor::new()).build(connector),
            connect_timeout: config.connect_timeout(),
            response_timeout: config.response_timeout(),
        }
    }

    /// Forward a plain request and relay the upstream response
    pub async fn forward(
        &self,
        req: Request<Incoming>,
        rule: &Rule,
    ) -> Result<ProxyResponse, ProxyError> {
        let (mut parts, body) = req.into_parts();

        let path_and_query =
            rewrite_path_and_query(rule.rewrite.as_ref(), parts.uri.path(), parts.uri.query());
        parts.uri = upstream_uri(&rule.target, &path_and_query)?;

        strip_hop_by_hop(&mut parts.headers);
        apply_origin(&mut parts.headers, &rule.target, rule.change_origin);

        let upstream_req = Request::from_parts(parts, body);
        let target = rule.target.origin();

        let resp = timeout(self.response_timeout, self.client.request(upstream_req))
            .await
            .map_err(|_| ProxyError::Timeout {
                target: target.clone(),
                after: self.response_timeout,
            })?
            .map_err(|e| {
                let reason = error_chain(&e);
                if e.is_connect() {
                    ProxyError::Unreachable { target, reason }
                } else {
                    ProxyError::Upstream { target, reason }
                }
            })?;

        let (mut parts, body) = resp.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, body.boxed()))
    }
}

/// Absolute-form URI for the pooled client
fn upstream_uri(target: &Target, path_and_query: &str) -> Result<Uri, ProxyError> {
    let path_and_query: PathAndQuery = path_and_query
        .parse()
        .map_err(|e: hyper::http::uri::InvalidUri| hyper::http::Error::from(e))?;

    Ok(Uri::builder()
        .scheme(target.scheme.clone())
        .authority(target.authority.clone())
        .path_and_query(path_and_query)
        .build()?)
}

/// Flatten an error and its sources into one line
#[must_use]
pub fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_uri() {
        let target = Target::http("localhost:5000".parse().unwrap());
        let uri = upstream_uri(&target, "/users/1?expand=roles").unwrap();
        assert_eq!(uri.to_string(), "http://localhost:5000/users/1?expand=roles");
    }

    #[test]
    fn test_error_chain() {
        let inner = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let outer = ProxyError::Upstream {
            target: "http://localhost:5000".to_string(),
            reason: error_chain(&inner),
        };
        assert_eq!(
            error_chain(&outer),
            "upstream http://localhost:5000 failed: connection refused"
        );
    }
}
