//! Request entry point
//!
//! Captures what later stages need from the request head, runs the pipeline
//! and writes the access log line.

use hyper::body::{Body, Incoming};
use hyper::header::{
    HeaderName, HeaderValue, ACCEPT, CONTENT_LENGTH, IF_NONE_MATCH, REFERER, SERVER, USER_AGENT,
};
use hyper::{Method, Request, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::http::ProxyResponse;
use crate::logger::{self, AccessLogEntry};
use crate::routing::match_rule;

/// Request head data used by the local stages
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub path: String,
    pub method: Method,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub accepts_html: bool,
    pub content_length: Option<u64>,
}

impl RequestContext {
    #[must_use]
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let headers = req.headers();
        let header_str = |name: HeaderName| headers.get(name).and_then(|v| v.to_str().ok());

        Self {
            path: req.uri().path().to_string(),
            method: req.method().clone(),
            is_head: req.method() == Method::HEAD,
            if_none_match: header_str(IF_NONE_MATCH).map(ToString::to_string),
            accepts_html: header_str(ACCEPT).is_none_or(accepts_html),
            content_length: header_str(CONTENT_LENGTH).and_then(|v| v.parse().ok()),
        }
    }

    /// Browser-like GET for `path`
    #[cfg(test)]
    pub fn for_path(path: &str) -> Self {
        Self {
            path: path.to_string(),
            method: Method::GET,
            is_head: false,
            if_none_match: None,
            accepts_html: true,
            content_length: None,
        }
    }
}

/// `text/html` or `*/*` in an Accept header. No header at all counts as
/// accepting anything.
fn accepts_html(accept: &str) -> bool {
    accept
        .split(',')
        .map(|item| item.split(';').next().unwrap_or("").trim())
        .any(|media| media.eq_ignore_ascii_case("text/html") || media == "*/*")
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<ProxyResponse, Infallible> {
    if !state.access_log {
        let mut resp = state.pipeline.run(req).await;
        set_server_header(&mut resp, &state.config.http.server_name);
        return Ok(resp);
    }

    let started = Instant::now();
    let mut entry = access_entry(&req, peer_addr);
    entry.upstream = state
        .pipeline
        .rules()
        .and_then(|rules| match_rule(req.uri().path(), rules))
        .map(|rule| rule.name.clone());

    let mut resp = state.pipeline.run(req).await;
    set_server_header(&mut resp, &state.config.http.server_name);

    entry.status = resp.status().as_u16();
    entry.body_bytes = resp.body().size_hint().exact().unwrap_or(0);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    logger::log_access(&entry, &state.config.logging.access_log_format);

    Ok(resp)
}

/// Name local responses; an upstream `Server` header is left alone
fn set_server_header(resp: &mut ProxyResponse, server_name: &str) {
    if resp.headers().contains_key(SERVER) {
        return;
    }
    if let Ok(value) = HeaderValue::from_str(server_name) {
        resp.headers_mut().insert(SERVER, value);
    }
}

fn access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        Version::HTTP_10 => "1.0",
        _ => "1.1",
    }
    .to_string();
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_from_request() {
        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/assets/app.js?v=2")
            .header(IF_NONE_MATCH, "\"abc\"")
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9")
            .header(CONTENT_LENGTH, "42")
            .body(())
            .unwrap();

        let ctx = RequestContext::from_request(&req);
        assert_eq!(ctx.path, "/assets/app.js");
        assert!(ctx.is_head);
        assert_eq!(ctx.if_none_match.as_deref(), Some("\"abc\""));
        assert!(ctx.accepts_html);
        assert_eq!(ctx.content_length, Some(42));
    }

    #[test]
    fn test_accepts_html() {
        assert!(accepts_html("text/html"));
        assert!(accepts_html("application/json, */*;q=0.1"));
        assert!(accepts_html("TEXT/HTML; charset=utf-8"));
        assert!(!accepts_html("application/json"));
        assert!(!accepts_html("image/webp,image/*"));
    }

    #[test]
    fn test_missing_accept_counts_as_html() {
        let req = Request::builder().uri("/settings").body(()).unwrap();
        assert!(RequestContext::from_request(&req).accepts_html);
    }

    #[test]
    fn test_server_header_keeps_upstream_value() {
        let mut local = crate::http::build_404_response();
        set_server_header(&mut local, "devserver");
        assert_eq!(local.headers()[SERVER], "devserver");

        let mut upstream = crate::http::build_404_response();
        upstream.headers_mut().insert(SERVER, HeaderValue::from_static("uvicorn"));
        set_server_header(&mut upstream, "devserver");
        assert_eq!(upstream.headers()[SERVER], "uvicorn");
    }

    #[test]
    fn test_access_entry_fields() {
        let req = Request::builder()
            .uri("/api/users?page=2")
            .version(Version::HTTP_10)
            .header(USER_AGENT, "curl/8.0")
            .body(())
            .unwrap();
        let entry = access_entry(&req, "10.0.0.7:51234".parse().unwrap());
        assert_eq!(entry.remote_addr, "10.0.0.7");
        assert_eq!(entry.path, "/api/users");
        assert_eq!(entry.query.as_deref(), Some("page=2"));
        assert_eq!(entry.http_version, "1.0");
        assert_eq!(entry.user_agent.as_deref(), Some("curl/8.0"));
        assert!(entry.referer.is_none());
    }
}
