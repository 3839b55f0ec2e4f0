//! Preload header synthesis.
//!
//! For a request whose path is in the manifest, every asset becomes a pair
//! of response headers:
//!
//! ```text
//! Link: <http://example.org/app.css>; rel=preload; as=style
//! X-Associated-Content: "http://example.org/app.css"
//! ```
//!
//! Relative asset URLs are resolved against the request's scheme and host.

mod middleware;

pub use middleware::{Handler, PreloadHandler, wrap};

use percent_encoding::percent_decode_str;
use tiny_http::{Header, Request};

use crate::asset::{Asset, AssetKind, is_absolute_url};
use crate::debug;
use crate::manifest::Manifest;

pub const LINK: &str = "Link";
pub const ASSOCIATED_CONTENT: &str = "X-Associated-Content";
pub const FORWARDED_PROTO: &str = "X-Forwarded-Proto";

/// The parts of a request that header synthesis looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    /// Decoded URL path, without the query string.
    pub path: String,
    /// `Host` header value.
    pub host: String,
    /// `X-Forwarded-Proto` header value, if any.
    pub forwarded_proto: Option<String>,
    /// Whether the connection itself is TLS.
    pub secure: bool,
}

impl RequestMeta {
    pub fn from_request(request: &Request) -> Self {
        let raw_path = request.url().split(['?', '#']).next().unwrap_or_default();
        let path = percent_decode_str(raw_path)
            .decode_utf8()
            .map(std::borrow::Cow::into_owned)
            .unwrap_or_else(|_| raw_path.to_string());

        Self {
            path,
            host: header_value(request, "Host").unwrap_or_default(),
            forwarded_proto: header_value(request, FORWARDED_PROTO),
            secure: request.secure(),
        }
    }

    /// `X-Forwarded-Proto` if set, else `https` for TLS, else `http`.
    pub fn scheme(&self) -> &str {
        match self.forwarded_proto.as_deref() {
            Some(proto) if !proto.is_empty() => proto,
            _ if self.secure => "https",
            _ => "http",
        }
    }
}

/// First value of header `name` (case-insensitive).
fn header_value(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case(name))
        .map(|h| h.value.to_string())
}

/// Absolute URL for `url` as seen from `scheme://host`.
///
/// URLs that already start with `http:` or `https:` are returned as-is.
pub fn resolve_url(scheme: &str, host: &str, url: &str) -> String {
    if is_absolute_url(url) {
        return url.to_string();
    }
    format!("{}://{}", scheme, join_path(host, url))
}

/// `Link` header value: `<url>; rel=preload[; as=kind]`.
pub fn link_value(url: &str, kind: AssetKind) -> String {
    if kind.is_none() {
        format!("<{url}>; rel=preload")
    } else {
        format!("<{url}>; rel=preload; as={kind}")
    }
}

/// Header name/value pairs for `assets`, in order.
pub fn header_pairs(scheme: &str, host: &str, assets: &[Asset]) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::with_capacity(assets.len() * 2);
    for asset in assets {
        let url = resolve_url(scheme, host, &asset.url);
        pairs.push((LINK, link_value(&url, asset.kind)));
        pairs.push((ASSOCIATED_CONTENT, quote(&url)));
    }
    pairs
}

/// Preload headers for the request, or `None` if its path has no entry.
///
/// Values that cannot be carried in an HTTP header (non-ASCII URLs) are
/// skipped.
pub fn preload_headers(manifest: &Manifest, meta: &RequestMeta) -> Option<Vec<Header>> {
    let assets = manifest.get(&meta.path)?;
    let headers = header_pairs(meta.scheme(), &meta.host, assets)
        .into_iter()
        .filter_map(|(name, value)| match Header::from_bytes(name, value.as_bytes()) {
            Ok(header) => Some(header),
            Err(()) => {
                debug!("preload"; "skipping {} header for {}: {}", name, meta.path, value);
                None
            }
        })
        .collect();
    Some(headers)
}

// ============================================================================
// helpers
// ============================================================================

/// Join `base` and `elem` with `/` and clean the result.
///
/// Empty elements are ignored; the result is empty only when both are.
fn join_path(base: &str, elem: &str) -> String {
    match (base.is_empty(), elem.is_empty()) {
        (true, true) => String::new(),
        (false, true) => clean_path(base),
        (true, false) => clean_path(elem),
        (false, false) => clean_path(&format!("{base}/{elem}")),
    }
}

/// Lexically clean a slash-separated path.
///
/// Collapses repeated slashes, drops `.` segments, resolves `..` against the
/// preceding segment and removes any trailing slash.
fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            s => segments.push(s),
        }
    }

    let joined = segments.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Double-quoted string with `\` and `"` escaped and control characters
/// written as escapes such as `\n` or `\a`, falling back to `\xNN`.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\u{b}' => out.push_str("\\v"),
            '\u{c}' => out.push_str("\\f"),
            c if c.is_ascii_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
