//! Static file serving module
//!
//! Serves the built client, extra directory mounts, and the application
//! shell fallback. Missing files return `None` so the next stage can decide.

use hyper::body::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::config::StaticMount;
use crate::handler::router::RequestContext;
use crate::http::cache::{self, CachePolicy};
use crate::http::response::{build_304_response, build_file_response};
use crate::http::{mime, ProxyResponse};
use crate::logger;

/// Serve `ctx.path` from the first matching mount, else from `root`
pub async fn serve_static(
    ctx: &RequestContext,
    root: &str,
    mounts: &[StaticMount],
    index_files: &[String],
) -> Option<ProxyResponse> {
    let (dir, prefix) = mounts
        .iter()
        .find(|m| ctx.path.starts_with(&m.prefix))
        .map_or((root, "/"), |m| (m.dir.as_str(), m.prefix.as_str()));

    let file = resolve_in_directory(dir, &ctx.path, prefix, index_files)?;
    serve_file(ctx, &file, CachePolicy::NoCache).await
}

/// Serve a single known file
pub async fn serve_file(
    ctx: &RequestContext,
    path: &Path,
    policy: CachePolicy,
) -> Option<ProxyResponse> {
    let content = match fs::read(path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_debug(&format!("Failed to read file '{}': {e}", path.display()));
            return None;
        }
    };

    let etag = cache::generate_etag(&content);
    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        return Some(build_304_response(&etag, policy));
    }

    Some(build_file_response(
        Bytes::from(content),
        mime::content_type_for(path),
        &etag,
        policy,
        ctx.is_head,
    ))
}

/// Map a request path onto a file below `static_dir`.
///
/// Directory requests try `index_files`. Anything resolving outside
/// `static_dir` after canonicalisation is rejected.
#[must_use]
pub fn resolve_in_directory(
    static_dir: &str,
    path: &str,
    route_prefix: &str,
    index_files: &[String],
) -> Option<PathBuf> {
    let relative_path = path
        .strip_prefix(route_prefix)
        .unwrap_or(path)
        .trim_start_matches('/');
    let decoded = percent_decode(relative_path)?;

    let static_dir_canonical = match Path::new(static_dir).canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{static_dir}': {e}"
            ));
            return None;
        }
    };

    let mut file_path = static_dir_canonical.join(&decoded);
    if file_path.is_dir() {
        file_path = index_files
            .iter()
            .map(|index| file_path.join(index))
            .find(|candidate| candidate.is_file())?;
    }

    // File not found is common (404), no need to log at warning level
    let file_path_canonical = file_path.canonicalize().ok()?;
    if !file_path_canonical.starts_with(&static_dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            file_path_canonical.display()
        ));
        return None;
    }

    file_path_canonical.is_file().then_some(file_path_canonical)
}

/// Decode `%XX` escapes; rejects malformed escapes and encoded NULs
fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = input.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            let byte = u8::from_str_radix(hex, 16).ok()?;
            if byte == 0 {
                return None;
            }
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
