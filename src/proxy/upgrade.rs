//! Protocol-upgrade passthrough
//!
//! The handshake is forwarded once (path rewritten once, if at all) on a
//! dedicated upstream connection. After a `101` both sides are upgraded and
//! raw bytes are relayed until either peer closes.
//!
//! ```text
//! Client ──upgrade──▶ devserver ──upgrade──▶ Backend
//! Client ◀═══════════ bytes, both ways ═════▶ Backend
//! ```

use std::time::Duration;

use http_body_util::{BodyExt, Empty};
use hyper::body::{Bytes, Incoming};
use hyper::{Request, Response, StatusCode, Version};
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::client::{error_chain, Forwarder};
use super::headers::{apply_origin, prepare_upgrade_headers, strip_hop_by_hop};
use crate::error::ProxyError;
use crate::http::{empty, ProxyResponse};
use crate::logger;
use crate::routing::{rewrite_path_and_query, Rule};

/// Which peer ended a relay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedBy {
    Client,
    Upstream,
}

/// Result of a finished relay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelaySummary {
    pub closed_by: ClosedBy,
    /// Bytes copied in the direction that finished first; 0 if it failed
    pub bytes: u64,
    /// Set when that direction ended with an I/O error instead of EOF
    pub error: Option<std::io::ErrorKind>,
}

impl RelaySummary {
    fn from_copy(closed_by: ClosedBy, copied: std::io::Result<u64>) -> Self {
        match copied {
            Ok(bytes) => Self {
                closed_by,
                bytes,
                error: None,
            },
            Err(e) => Self {
                closed_by,
                bytes: 0,
                error: Some(e.kind()),
            },
        }
    }
}

/// Forward an upgrade handshake and, on `101`, start the byte relay
pub async fn forward_upgrade(
    mut req: Request<Incoming>,
    rule: &Rule,
    forwarder: &Forwarder,
) -> Result<ProxyResponse, ProxyError> {
    let client_upgrade = hyper::upgrade::on(&mut req);
    let (parts, _body) = req.into_parts();

    let path_and_query =
        rewrite_path_and_query(rule.rewrite.as_ref(), parts.uri.path(), parts.uri.query());
    let mut headers = parts.headers;
    prepare_upgrade_headers(&mut headers);
    apply_origin(&mut headers, &rule.target, rule.change_origin);

    let mut upstream_req = Request::builder()
        .method(parts.method)
        .uri(path_and_query.as_str())
        .version(Version::HTTP_11)
        .body(Empty::<Bytes>::new())?;
    *upstream_req.headers_mut() = headers;

    let target = rule.target.origin();
    let stream = connect(rule, forwarder.connect_timeout).await?;

    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .map_err(|e| ProxyError::Upstream {
            target: target.clone(),
            reason: error_chain(&e),
        })?;
    tokio::task::spawn_local(async move {
        if let Err(e) = conn.with_upgrades().await {
            logger::log_debug(&format!("Upstream upgrade connection ended: {e}"));
        }
    });

    let mut resp = timeout(forwarder.response_timeout, sender.send_request(upstream_req))
        .await
        .map_err(|_| ProxyError::Timeout {
            target: target.clone(),
            after: forwarder.response_timeout,
        })?
        .map_err(|e| ProxyError::Upstream {
            target: target.clone(),
            reason: error_chain(&e),
        })?;

    if resp.status() != StatusCode::SWITCHING_PROTOCOLS {
        // Upstream declined; relay its answer like any other response
        let (mut parts, body) = resp.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        return Ok(Response::from_parts(parts, body.boxed()));
    }

    let upstream_upgrade = hyper::upgrade::on(&mut resp);
    let rule_name = rule.name.clone();
    tokio::task::spawn_local(async move {
        match tokio::try_join!(client_upgrade, upstream_upgrade) {
            Ok((client_io, upstream_io)) => {
                logger::log_relay_opened(&rule_name, &path_and_query);
                let summary = relay(TokioIo::new(client_io), TokioIo::new(upstream_io)).await;
                logger::log_relay_closed(&rule_name, summary);
            }
            Err(e) => {
                logger::log_debug(&format!("Upgrade for rule '{rule_name}' abandoned: {e}"));
            }
        }
    });

    let mut switching = Response::new(empty());
    *switching.status_mut() = StatusCode::SWITCHING_PROTOCOLS;
    *switching.headers_mut() = resp.headers().clone();
    Ok(switching)
}

async fn connect(rule: &Rule, connect_timeout: Duration) -> Result<TcpStream, ProxyError> {
    let target = rule.target.origin();
    let stream = timeout(connect_timeout, TcpStream::connect(rule.target.authority.as_str()))
        .await
        .map_err(|_| ProxyError::Unreachable {
            target: target.clone(),
            reason: format!("connect timed out after {}ms", connect_timeout.as_millis()),
        })?
        .map_err(|e| ProxyError::Unreachable {
            target,
            reason: e.to_string(),
        })?;
    stream.set_nodelay(true).ok();
    Ok(stream)
}

/// Copy bytes both ways until either side reaches EOF or fails.
///
/// Each direction preserves byte order. When one direction ends, both write
/// halves are shut down and both connections are dropped, so the other peer
/// sees the close promptly.
pub async fn relay<C, U>(client: C, upstream: U) -> RelaySummary
where
    C: AsyncRead + AsyncWrite + Send,
    U: AsyncRead + AsyncWrite + Send,
{
    let (mut client_rd, mut client_wr) = tokio::io::split(client);
    let (mut upstream_rd, mut upstream_wr) = tokio::io::split(upstream);

    let summary = tokio::select! {
        sent = tokio::io::copy(&mut client_rd, &mut upstream_wr) => {
            RelaySummary::from_copy(ClosedBy::Client, sent)
        }
        received = tokio::io::copy(&mut upstream_rd, &mut client_wr) => {
            RelaySummary::from_copy(ClosedBy::Upstream, received)
        }
    };

    let _ = upstream_wr.shutdown().await;
    let _ = client_wr.shutdown().await;
    summary
}
