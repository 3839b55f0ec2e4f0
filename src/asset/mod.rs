//! Assets referenced by HTML pages and the scanner that finds them.

mod kind;
pub mod scan;

pub use kind::AssetKind;
pub use scan::{ScanError, ScanOptions, scan_html, scan_reader};

use serde::{Deserialize, Serialize};

/// A resource a page depends on: its URL and request type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: AssetKind,
}

impl Asset {
    pub fn new(url: impl Into<String>, kind: AssetKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }

    /// Whether the URL carries its own scheme (`http:` or `https:`).
    pub fn is_absolute(&self) -> bool {
        is_absolute_url(&self.url)
    }
}

/// Check for an `http:` or `https:` prefix.
pub fn is_absolute_url(url: &str) -> bool {
    url.starts_with("http:") || url.starts_with("https:")
}
