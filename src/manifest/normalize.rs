//! Source path to manifest key mapping.
//!
//! ```text
//! strip = "public", index = "index.html", noext = true
//!
//! public/index.html        -> /
//! public/about.html        -> /about
//! public/blog/index.html   -> /blog/
//! public/blog/post-1.htm   -> /blog/post-1
//! ```

use std::path::Path;

/// Default index file mapped to its directory.
pub const DEFAULT_INDEX_FILE: &str = "index.html";

/// Turns source file locations into request paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathNormalizer {
    strip_prefix: String,
    index_file: String,
    strip_extension: bool,
}

impl Default for PathNormalizer {
    fn default() -> Self {
        Self::new("", DEFAULT_INDEX_FILE, true)
    }
}

impl PathNormalizer {
    /// A leading `/` on `index_file` is ignored.
    pub fn new(
        strip_prefix: impl Into<String>,
        index_file: impl AsRef<str>,
        strip_extension: bool,
    ) -> Self {
        Self {
            strip_prefix: strip_prefix.into(),
            index_file: index_file.as_ref().trim_start_matches('/').to_string(),
            strip_extension,
        }
    }

    /// Manifest key for the source at `path`. Always starts with `/`.
    pub fn normalize(&self, path: &Path) -> String {
        let raw = path_to_slash(path);

        let mut key = raw
            .strip_prefix(self.strip_prefix.as_str())
            .unwrap_or(&raw)
            .to_string();

        if !key.starts_with('/') {
            key.insert(0, '/');
        }

        if !self.index_file.is_empty()
            && key.ends_with(&self.index_file)
            && key[..key.len() - self.index_file.len()].ends_with('/')
        {
            key.truncate(key.len() - self.index_file.len());
        }

        if self.strip_extension {
            strip_extension(&mut key);
        }

        key
    }
}

/// Render a path with `/` separators.
fn path_to_slash(path: &Path) -> String {
    let s = path.to_string_lossy();
    if cfg!(windows) {
        s.replace('\\', "/")
    } else {
        s.into_owned()
    }
}

/// Drop the extension (last `.` and after) of the final path segment.
fn strip_extension(key: &mut String) {
    let segment_start = key.rfind('/').map_or(0, |i| i + 1);
    if let Some(dot) = key[segment_start..].rfind('.') {
        key.truncate(segment_start + dot);
    }
}
