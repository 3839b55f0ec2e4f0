//! Content-Type values for files served by `preload serve`.
//!
//! Covers what a static site links from its pages: documents, the
//! stylesheets, scripts and images the scanner reports, plus fonts and
//! media they pull in. Anything else is served as an octet stream.

use std::path::Path;

/// Content types named outside the lookup table.
pub mod types {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const OCTET_STREAM: &str = "application/octet-stream";
}

/// Extensions (lowercase) and the content type they are served with.
const BY_EXTENSION: &[(&[&str], &str)] = &[
    (&["html", "htm"], types::HTML),
    (&["txt"], types::PLAIN),
    (&["json", "map"], types::JSON),
    (&["css"], "text/css; charset=utf-8"),
    (&["js", "mjs"], "text/javascript; charset=utf-8"),
    (&["xml"], "application/xml"),
    (&["vtt"], "text/vtt; charset=utf-8"),
    (&["svg"], "image/svg+xml"),
    (&["png"], "image/png"),
    (&["jpg", "jpeg"], "image/jpeg"),
    (&["gif"], "image/gif"),
    (&["webp"], "image/webp"),
    (&["avif"], "image/avif"),
    (&["ico"], "image/x-icon"),
    (&["woff"], "font/woff"),
    (&["woff2"], "font/woff2"),
    (&["ttf"], "font/ttf"),
    (&["otf"], "font/otf"),
    (&["mp4"], "video/mp4"),
    (&["webm"], "video/webm"),
    (&["mp3"], "audio/mpeg"),
    (&["ogg"], "audio/ogg"),
    (&["wasm"], "application/wasm"),
];

/// Content type for `path`, chosen by its extension.
pub fn from_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(lookup)
        .unwrap_or(types::OCTET_STREAM)
}

fn lookup(ext: &str) -> Option<&'static str> {
    BY_EXTENSION
        .iter()
        .find(|(exts, _)| exts.iter().any(|known| known.eq_ignore_ascii_case(ext)))
        .map(|&(_, content_type)| content_type)
}
