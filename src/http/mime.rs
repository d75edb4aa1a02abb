//! MIME type detection module
//!
//! Content-Type by file extension for the built client and its static assets.

use std::path::Path;

/// Content-Type for a file path, by extension
///
/// # Examples
/// ```
/// use devserver::http::mime::content_type_for;
/// assert_eq!(content_type_for("dist/index.html".as_ref()), "text/html; charset=utf-8");
/// assert_eq!(content_type_for("dist/manifest.webmanifest".as_ref()), "application/manifest+json");
/// assert_eq!(content_type_for("dist/LICENSE".as_ref()), "application/octet-stream");
/// ```
#[must_use]
pub fn content_type_for(path: &Path) -> &'static str {
    get_content_type(path.extension().and_then(|e| e.to_str()))
}

/// Get MIME Content-Type based on file extension
#[must_use]
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        // Text
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("txt" | "md") => "text/plain; charset=utf-8",
        Some("xml") => "application/xml",

        // JavaScript/WASM
        Some("js" | "mjs" | "cjs") => "text/javascript; charset=utf-8",
        Some("map" | "json") => "application/json",
        Some("webmanifest") => "application/manifest+json",
        Some("wasm") => "application/wasm",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",

        // Media
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",
        Some("eot") => "application/vnd.ms-fontobject",

        // Archives
        Some("zip") => "application/zip",
        Some("7z") => "application/x-7z-compressed",

        // Default
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(get_content_type(Some("html")), "text/html; charset=utf-8");
        assert_eq!(get_content_type(Some("css")), "text/css");
        assert_eq!(get_content_type(Some("js")), "text/javascript; charset=utf-8");
        assert_eq!(get_content_type(Some("map")), "application/json");
        assert_eq!(get_content_type(Some("ico")), "image/x-icon");
        assert_eq!(get_content_type(Some("7z")), "application/x-7z-compressed");
    }

    #[test]
    fn test_content_type_for_path() {
        assert_eq!(content_type_for(Path::new("dist/assets/app.3f2a.js")), "text/javascript; charset=utf-8");
        assert_eq!(content_type_for(Path::new("dist/sw")), "application/octet-stream");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(get_content_type(Some("xyz")), "application/octet-stream");
        assert_eq!(get_content_type(None), "application/octet-stream");
    }
}
