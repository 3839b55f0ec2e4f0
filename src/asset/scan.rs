//! HTML asset scanning (pure, no side effects).
//!
//! Walks a parsed document in order and collects the URLs of
//! `<img src>`, `<script src>` and `<link href>` (stylesheets and imports
//! only). Candidate elements are not descended into; every other element's
//! subtree is.
//!
//! ```text
//! <html>
//!   <head>
//!     <link rel="stylesheet" href="/app.css">   -> /app.css (style)
//!     <link rel="icon" href="/favicon.ico">     -> (skipped)
//!     <script src="/app.js"></script>           -> /app.js (script)
//!   </head>
//!   <body><img src="/logo.png"></body>          -> /logo.png (image)
//! </html>
//! ```
//!
//! Documents are parsed with the HTML5 tree builder, so script and style
//! bodies are raw text and `<textarea>` / `<title>` content is plain text:
//! markup-like strings inside them never yield assets. Parsing recovers
//! from any malformed markup; only reading and decoding can fail.

use std::io::Read;

use rustc_hash::FxHashMap;
use scraper::Html;
use scraper::node::Element;
use thiserror::Error;

use super::{Asset, AssetKind};

const REL_STYLESHEET: &str = "stylesheet";
const REL_IMPORT: &str = "import";

/// Scanner switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Drop assets whose URL starts with `http:` or `https:`.
    pub exclude_absolute: bool,
    /// Return one asset per distinct URL.
    pub dedup: bool,
}

/// A document that could not be scanned.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read document")]
    Read(#[from] std::io::Error),

    #[error("document is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Read a whole document from `reader` and scan it.
pub fn scan_reader(mut reader: impl Read, options: ScanOptions) -> Result<Vec<Asset>, ScanError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let markup = String::from_utf8(bytes)?;
    Ok(scan_html(&markup, options))
}

/// Scan HTML markup for preloadable assets.
pub fn scan_html(markup: &str, options: ScanOptions) -> Vec<Asset> {
    let document = Html::parse_document(markup);

    let mut assets = Vec::new();
    // Explicit stack in reverse so pops follow document order.
    let mut stack: Vec<_> = document.tree.root().children().rev().collect();

    while let Some(node) = stack.pop() {
        let Some(element) = node.value().as_element() else {
            continue;
        };

        match candidate(element) {
            Some(asset) => {
                if keep(&asset, options) {
                    assets.push(asset);
                }
            }
            None => stack.extend(node.children().rev()),
        }
    }

    if options.dedup {
        dedup_by_url(assets)
    } else {
        assets
    }
}

/// Asset described by `element`, or `None` if it is not a candidate.
///
/// A candidate may still carry an empty URL (e.g. an inline `<script>`).
/// The tree builder lowercases tag and attribute names and decodes
/// character references in values.
fn candidate(element: &Element) -> Option<Asset> {
    let attr = |name: &str| element.attr(name).unwrap_or_default();

    match element.name() {
        "link" => {
            let rel = attr("rel");
            let kind = if rel.eq_ignore_ascii_case(REL_STYLESHEET) {
                AssetKind::Style
            } else if rel.eq_ignore_ascii_case(REL_IMPORT) {
                AssetKind::None
            } else {
                return None;
            };
            Some(Asset::new(attr("href"), kind))
        }
        "script" => Some(Asset::new(attr("src"), AssetKind::Script)),
        "img" => Some(Asset::new(attr("src"), AssetKind::Image)),
        _ => None,
    }
}

fn keep(asset: &Asset, options: ScanOptions) -> bool {
    !asset.url.is_empty() && !(options.exclude_absolute && asset.is_absolute())
}

/// Collapse repeated URLs: first position, last kind.
fn dedup_by_url(assets: Vec<Asset>) -> Vec<Asset> {
    let mut seen: FxHashMap<String, usize> = FxHashMap::default();
    let mut unique: Vec<Asset> = Vec::with_capacity(assets.len());

    for asset in assets {
        match seen.get(&asset.url) {
            Some(&i) => unique[i] = asset,
            None => {
                seen.insert(asset.url.clone(), unique.len());
                unique.push(asset);
            }
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html>
<head>
  <link rel="stylesheet" href="/css/app.css">
  <link rel="import" href="/components/nav.html">
  <link rel="icon" href="/favicon.ico">
  <script src="/js/app.js"></script>
  <script>console.log("inline")</script>
</head>
<body>
  <div><p><img src="/img/logo.png" alt="logo"></p></div>
  <img src="https://cdn.example.org/banner.png">
  <img src="">
</body>
</html>"#;

    fn urls(assets: &[Asset]) -> Vec<&str> {
        assets.iter().map(|a| a.url.as_str()).collect()
    }

    #[test]
    fn test_scan_document_order() {
        let assets = scan_html(PAGE, ScanOptions::default());
        assert_eq!(
            urls(&assets),
            [
                "/css/app.css",
                "/components/nav.html",
                "/js/app.js",
                "/img/logo.png",
                "https://cdn.example.org/banner.png",
            ]
        );
    }

    #[test]
    fn test_scan_kinds() {
        let assets = scan_html(PAGE, ScanOptions::default());
        let kinds: Vec<_> = assets.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            [
                AssetKind::Style,
                AssetKind::None,
                AssetKind::Script,
                AssetKind::Image,
                AssetKind::Image,
            ]
        );
    }

    #[test]
    fn test_scan_exclude_absolute() {
        let html = r#"<img src="http://a.org/1.png"><img src="https://a.org/2.png">
            <img src="//a.org/3.png"><img src="/4.png"><img src="5.png">"#;
        let options = ScanOptions {
            exclude_absolute: true,
            ..Default::default()
        };
        let assets = scan_html(html, options);
        assert_eq!(urls(&assets), ["//a.org/3.png", "/4.png", "5.png"]);
    }

    #[test]
    fn test_scan_keeps_duplicates_without_dedup() {
        let html = r#"<link rel="stylesheet" href="/a.css"><div><link rel="stylesheet" href="/a.css"></div>"#;
        let assets = scan_html(html, ScanOptions::default());
        assert_eq!(urls(&assets), ["/a.css", "/a.css"]);
    }

    #[test]
    fn test_scan_dedup_first_position_last_kind() {
        let html = r#"<script src="/x"></script><img src="/y"><img src="/x">"#;
        let options = ScanOptions {
            dedup: true,
            ..Default::default()
        };
        let assets = scan_html(html, options);
        assert_eq!(
            assets,
            [
                Asset::new("/x", AssetKind::Image),
                Asset::new("/y", AssetKind::Image),
            ]
        );
    }

    #[test]
    fn test_scan_case_insensitive_names() {
        let assets = scan_html(r#"<LINK REL="Stylesheet" HREF="/a.css">"#, ScanOptions::default());
        assert_eq!(assets, [Asset::new("/a.css", AssetKind::Style)]);

        let assets = scan_html(r#"<IMG SRC="/b.png">"#, ScanOptions::default());
        assert_eq!(assets, [Asset::new("/b.png", AssetKind::Image)]);
    }

    #[test]
    fn test_scan_decodes_entities() {
        let html = r#"<script src="/app.js?v=1&amp;lang=en"></script>"#;
        let assets = scan_html(html, ScanOptions::default());
        assert_eq!(urls(&assets), ["/app.js?v=1&lang=en"]);
    }

    #[test]
    fn test_scan_empty_document() {
        assert!(scan_html("", ScanOptions::default()).is_empty());
        assert!(scan_html("<p>no assets here</p>", ScanOptions::default()).is_empty());
    }

    #[test]
    fn test_scan_reader_rejects_invalid_utf8() {
        let bytes: &[u8] = b"<img src=\"/a.png\">\xff\xfe";
        let err = scan_reader(bytes, ScanOptions::default()).unwrap_err();
        assert!(matches!(err, ScanError::Utf8(_)));
    }

    #[test]
    fn test_scan_reader_reads_document() {
        let assets = scan_reader(PAGE.as_bytes(), ScanOptions::default()).unwrap();
        assert_eq!(assets.len(), 5);
    }

    #[test]
    fn test_scan_script_body_is_raw_text() {
        let html = r#"<html><head><script>if (a < b) {}</script></head><body><img src="/x.png"></body></html>"#;
        assert_eq!(urls(&scan_html(html, ScanOptions::default())), ["/x.png"]);

        let html = r#"<script>var s = "<div>"; var t = '<img src="/fake.png">';</script><img src="/after.png">"#;
        assert_eq!(urls(&scan_html(html, ScanOptions::default())), ["/after.png"]);
    }

    #[test]
    fn test_scan_style_and_textarea_are_text() {
        let html = r#"<style>a::before { content: "<img src=/in-style.png>"; }</style>
            <textarea><img src=/in-textarea.png></textarea>
            <title><script src="/in-title.js"></script></title>
            <img src="/real.png">"#;
        assert_eq!(urls(&scan_html(html, ScanOptions::default())), ["/real.png"]);
    }

    #[test]
    fn test_scan_unquoted_attributes() {
        assert_eq!(
            scan_html("<img src=/c.png>", ScanOptions::default()),
            [Asset::new("/c.png", AssetKind::Image)]
        );

        let html = r#"<head><link rel="stylesheet" href="/a.css"><link rel=stylesheet href=/b.css></head><body><img src=/c.png></body>"#;
        assert_eq!(
            urls(&scan_html(html, ScanOptions::default())),
            ["/a.css", "/b.css", "/c.png"]
        );
    }

    #[test]
    fn test_scan_unclosed_tags_recover() {
        let html = r#"<div><p><img src="/a.png"><span><script src="/b.js"></script>"#;
        assert_eq!(urls(&scan_html(html, ScanOptions::default())), ["/a.png", "/b.js"]);
    }
}
