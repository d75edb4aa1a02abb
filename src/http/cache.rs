//! HTTP cache control module
//!
//! `ETag` generation and conditional request handling for static files.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Generate a quoted `ETag` from file content
#[must_use]
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}\"", hasher.finish())
}

/// Whether the client's `If-None-Match` covers the server's `ETag`.
///
/// Handles lists (`"a", "b"`) and the `*` wildcard.
#[must_use]
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .map(str::trim)
            .any(|e| e == etag || e == "*" || e.strip_prefix("W/") == Some(etag))
    })
}

/// Cache-Control policy per kind of response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Always revalidate; files change under a dev server at any time
    NoCache,
    /// Never store (application shell served for client routes)
    NoStore,
}

impl CachePolicy {
    /// Convert to Cache-Control header value
    #[must_use]
    pub const fn to_header_value(self) -> &'static str {
        match self {
            Self::NoCache => "no-cache",
            Self::NoStore => "no-store",
        }
    }
}
