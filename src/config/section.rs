//! `[generate]` and `[serve]` sections.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::asset::ScanOptions;
use crate::manifest::{BuildOptions, DEFAULT_INDEX_FILE, PathNormalizer};

// ============================================================================
// [generate]
// ============================================================================

/// Manifest generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// File name that stands for its directory (`/blog/index.html` -> `/blog/`).
    pub index: String,
    /// Drop the file extension from manifest keys.
    pub noext: bool,
    /// Prefix removed from source paths before they become keys.
    pub strip: String,
    /// Where to write the manifest; empty means stdout.
    pub output: PathBuf,
    /// Scan workers; `0` uses the available parallelism.
    pub jobs: usize,
    /// Keep `http:` / `https:` URLs in the manifest; dropped by default.
    pub keep_absolute: bool,
    /// One entry per distinct URL within a page.
    pub dedup: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            index: DEFAULT_INDEX_FILE.to_string(),
            noext: true,
            strip: String::new(),
            output: PathBuf::new(),
            jobs: 0,
            keep_absolute: false,
            dedup: false,
        }
    }
}

impl GenerateConfig {
    pub fn normalizer(&self) -> PathNormalizer {
        PathNormalizer::new(self.strip.as_str(), self.index.as_str(), self.noext)
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            exclude_absolute: !self.keep_absolute,
            dedup: self.dedup,
        }
    }

    pub fn build_options(&self, progress: bool) -> BuildOptions {
        BuildOptions {
            concurrency: self.jobs,
            scan: self.scan_options(),
            progress,
        }
    }

    /// Output file, or `None` for stdout.
    pub fn output_path(&self) -> Option<&PathBuf> {
        (!self.output.as_os_str().is_empty()).then_some(&self.output)
    }
}

// ============================================================================
// [serve]
// ============================================================================

/// Static file server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    pub interface: IpAddr,
    pub port: u16,
    /// Directory served as the site root.
    pub root: PathBuf,
    /// Manifest consulted for preload headers.
    pub manifest: PathBuf,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5277,
            root: PathBuf::from("."),
            manifest: PathBuf::from("preload.json"),
        }
    }
}
