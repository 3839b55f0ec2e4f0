//! Preload manifest: request path -> assets the page references.
//!
//! # Module Structure
//!
//! ```text
//! manifest/
//! ├── build      # Concurrent batch generation over many sources
//! ├── normalize  # Source path -> request path key
//! ├── walk       # Source discovery (.html / .htm files)
//! └── mod.rs     # Manifest type and JSON persistence (this file)
//! ```
//!
//! # Format
//!
//! ```json
//! {
//!   "/": [
//!     { "url": "/css/app.css", "type": "style" },
//!     { "url": "/components/nav.html", "type": "" }
//!   ]
//! }
//! ```

pub mod build;
pub mod normalize;
pub mod walk;

pub use build::{BuildOptions, BuildReport, SourceError, build_manifest};
pub use normalize::{DEFAULT_INDEX_FILE, PathNormalizer};
pub use walk::collect_sources;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::asset::Asset;

/// Manifest persistence errors.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("IO error when opening manifest `{0}`")]
    Open(PathBuf, #[source] std::io::Error),

    #[error("failed to decode manifest")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode manifest")]
    Encode(#[source] serde_json::Error),

    #[error("failed to write manifest")]
    Write(#[source] std::io::Error),
}

/// Lookup table from request path to the assets of that page.
///
/// Keys are kept sorted so the encoded form is stable across builds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, Vec<Asset>>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assets registered for `path`, if the path is known.
    pub fn get(&self, path: &str) -> Option<&[Asset]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    /// Set the assets of `path`, returning the list it replaced.
    pub fn insert(&mut self, path: impl Into<String>, assets: Vec<Asset>) -> Option<Vec<Asset>> {
        self.entries.insert(path.into(), assets)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Asset])> {
        self.entries
            .iter()
            .map(|(path, assets)| (path.as_str(), assets.as_slice()))
    }

    // ========================================================================
    // persistence
    // ========================================================================

    /// Decode a manifest from JSON.
    pub fn from_reader(reader: impl Read) -> Result<Self, ManifestError> {
        serde_json::from_reader(reader).map_err(ManifestError::Decode)
    }

    /// Decode a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(json).map_err(ManifestError::Decode)
    }

    /// Open and decode a manifest file.
    pub fn read_file(path: &Path) -> Result<Self, ManifestError> {
        let file = File::open(path).map_err(|err| ManifestError::Open(path.to_path_buf(), err))?;
        Self::from_reader(BufReader::new(file))
    }

    /// Encode as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(self).map_err(ManifestError::Encode)
    }

    /// Write indented JSON followed by a newline.
    pub fn write_to(&self, mut writer: impl Write) -> Result<(), ManifestError> {
        let json = self.to_json_pretty()?;
        writer
            .write_all(json.as_bytes())
            .and_then(|()| writer.write_all(b"\n"))
            .and_then(|()| writer.flush())
            .map_err(ManifestError::Write)
    }
}

impl FromIterator<(String, Vec<Asset>)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Asset>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
