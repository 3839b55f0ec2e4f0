//! Source discovery.

use std::path::{Component, Path, PathBuf};

use jwalk::WalkDir;
use rustc_hash::FxHashSet;

use crate::log;

/// Extensions treated as HTML sources.
const HTML_EXTENSIONS: &[&str] = &["html", "htm"];

/// Collect HTML sources from files and directories.
///
/// A file argument is taken as-is, whatever its extension. Directories are
/// walked recursively (sorted) for `.html` / `.htm` files; unreadable
/// entries are logged and skipped. Paths are [`clean`]ed, so `./site` and
/// `site` produce the same keys. The result has no duplicates and keeps
/// first-seen order.
pub fn collect_sources(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut sources = Vec::new();

    for root in roots {
        if root.is_file() {
            sources.push(clean(root));
            continue;
        }

        for entry in WalkDir::new(root).sort(true) {
            match entry {
                Ok(entry) if entry.file_type().is_file() && is_html(&entry.path()) => {
                    sources.push(clean(&entry.path()));
                }
                Ok(_) => {}
                Err(e) => log!("walk"; "{}", e),
            }
        }
    }

    unique(sources)
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| HTML_EXTENSIONS.iter().any(|h| ext.eq_ignore_ascii_case(h)))
}

/// Lexically drop `.` components and fold `dir/..` pairs.
///
/// An empty result becomes `.`.
pub fn clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir
                if matches!(cleaned.components().next_back(), Some(Component::Normal(_))) =>
            {
                cleaned.pop();
            }
            other => cleaned.push(other),
        }
    }

    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }
    cleaned
}

/// Drop repeated paths, keeping the first occurrence.
pub fn unique(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = FxHashSet::default();
    paths
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{DEFAULT_INDEX_FILE, PathNormalizer};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_collect_walks_html_only() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("blog")).unwrap();
        fs::write(root.join("index.html"), "").unwrap();
        fs::write(root.join("blog/post.htm"), "").unwrap();
        fs::write(root.join("blog/data.json"), "{}").unwrap();
        fs::write(root.join("style.css"), "").unwrap();

        let sources = collect_sources(&[root.to_path_buf()]);
        assert_eq!(sources.len(), 2);
        assert!(sources.contains(&root.join("index.html")));
        assert!(sources.contains(&root.join("blog/post.htm")));
    }

    #[test]
    fn test_collect_explicit_file_and_dedup() {
        let dir = TempDir::new().unwrap();
        let page = dir.path().join("page.txt");
        fs::write(&page, "<img src=/a.png>").unwrap();

        let sources = collect_sources(&[page.clone(), page.clone()]);
        assert_eq!(sources, vec![page]);
    }

    #[test]
    fn test_collect_missing_root() {
        let dir = TempDir::new().unwrap();
        let sources = collect_sources(&[dir.path().join("missing")]);
        assert!(sources.is_empty());
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean(Path::new("./site/x.html")), PathBuf::from("site/x.html"));
        assert_eq!(clean(Path::new("site/./blog/../x.html")), PathBuf::from("site/x.html"));
        assert_eq!(clean(Path::new("../site/x.html")), PathBuf::from("../site/x.html"));
        assert_eq!(clean(Path::new("./")), PathBuf::from("."));
        assert_eq!(clean(Path::new("/srv/./site")), PathBuf::from("/srv/site"));
    }

    #[test]
    fn test_collect_dot_root_matches_strip() {
        let dir = TempDir::new().unwrap();
        let site = dir.path().join("site");
        fs::create_dir_all(&site).unwrap();
        fs::write(site.join("x.html"), "").unwrap();

        let dotted = PathBuf::from(format!("{}/./site", dir.path().display()));
        let sources = collect_sources(&[dotted.clone(), dotted.join("x.html")]);
        assert_eq!(sources, vec![site.join("x.html")]);

        let strip = site.to_string_lossy().into_owned();
        let normalizer = PathNormalizer::new(strip, DEFAULT_INDEX_FILE, true);
        assert_eq!(normalizer.normalize(&sources[0]), "/x");
    }

    #[test]
    fn test_unique_keeps_first_order() {
        let paths = vec![
            PathBuf::from("b.html"),
            PathBuf::from("a.html"),
            PathBuf::from("b.html"),
        ];
        assert_eq!(
            unique(paths),
            vec![PathBuf::from("b.html"), PathBuf::from("a.html")]
        );
    }
}
