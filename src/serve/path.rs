//! URL to filesystem path resolution.

use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Resolve a request URL to a file under `serve_root`.
///
/// Directories map to their `index.html`; an extensionless URL also
/// matches `<url>.html`, mirroring manifest keys generated with extension
/// stripping. Paths escaping `serve_root` resolve to `None`.
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);

    // Reject paths with suspicious patterns early
    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let root = serve_root.canonicalize().ok()?;
    let local = root.join(&clean);

    if let Some(found) = existing_file(&local, &root) {
        return Some(found);
    }

    if !clean.is_empty() && local.extension().is_none() {
        return existing_file(&local.with_extension("html"), &root);
    }

    None
}

/// `path` (or its index file) if it exists under `root` after resolving symlinks.
fn existing_file(path: &Path, root: &Path) -> Option<PathBuf> {
    let canonical = path.canonicalize().ok()?;
    if !canonical.starts_with(root) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    let index = canonical.join("index.html");
    (canonical.is_dir() && index.is_file()).then_some(index)
}

/// Normalize URL: strip query and fragment, decode, trim slashes
fn normalize_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(""));
    decoded.trim_matches('/').to_string()
}
