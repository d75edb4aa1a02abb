//! HTTP response building module
//!
//! Every stage answers with [`ProxyResponse`] so locally built responses and
//! streamed upstream responses share one type.

use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::Response;

use super::cache::CachePolicy;

/// Body type of every response leaving the server
pub type ProxyBody = BoxBody<Bytes, hyper::Error>;
pub type ProxyResponse = Response<ProxyBody>;

/// Wrap in-memory bytes as a [`ProxyBody`]
#[must_use]
pub fn full<T: Into<Bytes>>(chunk: T) -> ProxyBody {
    Full::new(chunk.into())
        .map_err(|never| match never {})
        .boxed()
}

#[must_use]
pub fn empty() -> ProxyBody {
    full(Bytes::new())
}

fn text_response(status: u16, text: &'static str) -> ProxyResponse {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(full(text))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            Response::new(full(text))
        })
}

/// Build 304 Not Modified response
#[must_use]
pub fn build_304_response(etag: &str, policy: CachePolicy) -> ProxyResponse {
    Response::builder()
        .status(304)
        .header("ETag", etag)
        .header("Cache-Control", policy.to_header_value())
        .body(empty())
        .unwrap_or_else(|e| {
            log_build_error(304, &e);
            Response::new(empty())
        })
}

/// Build 404 Not Found response
#[must_use]
pub fn build_404_response() -> ProxyResponse {
    text_response(404, "404 Not Found")
}

/// Build 405 Method Not Allowed response
#[must_use]
pub fn build_405_response() -> ProxyResponse {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(full("405 Method Not Allowed"))
        .unwrap_or_else(|e| {
            log_build_error(405, &e);
            Response::new(full("405 Method Not Allowed"))
        })
}

/// Build OPTIONS response for static content
#[must_use]
pub fn build_options_response() -> ProxyResponse {
    Response::builder()
        .status(204)
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(empty())
        .unwrap_or_else(|e| {
            log_build_error(204, &e);
            Response::new(empty())
        })
}

/// Build 413 Payload Too Large response
#[must_use]
pub fn build_413_response() -> ProxyResponse {
    text_response(413, "413 Payload Too Large")
}

/// Build a gateway error (502/504) naming the rule and its target
#[must_use]
pub fn build_gateway_error(status: u16, rule: &str, message: &str) -> ProxyResponse {
    let body = format!("proxy rule '{rule}': {message}\n");
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(full(body))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            let mut resp = Response::new(empty());
            *resp.status_mut() = hyper::StatusCode::BAD_GATEWAY;
            resp
        })
}

/// Build a file response with validator and cache policy
#[must_use]
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    etag: &str,
    policy: CachePolicy,
    is_head: bool,
) -> ProxyResponse {
    let content_length = data.len();
    let body = if is_head { empty() } else { full(data) };

    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header("ETag", etag)
        .header("Cache-Control", policy.to_header_value())
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error(200, &e);
            Response::new(empty())
        })
}

/// Log response build error
fn log_build_error(status: u16, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
