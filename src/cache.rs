//! Load-once manifest cache.
//!
//! A manifest is decoded the first time its name is requested and served
//! from memory afterwards, for the lifetime of the cache. There is no
//! invalidation: a changed manifest file needs a restart.
//!
//! Locking is per name. The table lock (a `DashMap` shard) is held only to
//! find or create a name's slot; the slot's own mutex is held across the
//! load, so concurrent first requests for one name decode it once while
//! loads of other names proceed independently.

use std::path::Path;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::debug;
use crate::manifest::{Manifest, ManifestError};

type Slot = Arc<Mutex<Option<Arc<Manifest>>>>;

/// Name -> decoded manifest, filled lazily.
#[derive(Default)]
pub struct ManifestCache {
    slots: DashMap<String, Slot>,
}

/// Process-wide cache used by [`load_manifest`].
pub static MANIFEST_CACHE: LazyLock<ManifestCache> = LazyLock::new(ManifestCache::new);

/// Read the manifest file `name` once per process.
pub fn load_manifest(name: &str) -> Result<Arc<Manifest>, ManifestError> {
    MANIFEST_CACHE.load(name)
}

impl ManifestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached manifest for `name`, running `loader` if absent.
    ///
    /// A failed load caches nothing; the next call runs a loader again.
    pub fn get_or_load<F, E>(&self, name: &str, loader: F) -> Result<Arc<Manifest>, E>
    where
        F: FnOnce() -> Result<Manifest, E>,
    {
        let slot = self.slot(name);
        let mut loaded = slot.lock();

        if let Some(manifest) = loaded.as_ref() {
            return Ok(Arc::clone(manifest));
        }

        let manifest = Arc::new(loader()?);
        *loaded = Some(Arc::clone(&manifest));
        debug!("cache"; "loaded manifest `{}` ({} paths)", name, manifest.len());
        Ok(manifest)
    }

    /// Decode the JSON manifest file at `name`, once.
    pub fn load(&self, name: &str) -> Result<Arc<Manifest>, ManifestError> {
        self.get_or_load(name, || Manifest::read_file(Path::new(name)))
    }

    /// Whether `name` has been loaded successfully.
    pub fn contains(&self, name: &str) -> bool {
        self.slots
            .get(name)
            .is_some_and(|slot| slot.lock().is_some())
    }

    /// Number of loaded manifests.
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|entry| entry.value().lock().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slot for `name`; the map guard is released before returning.
    fn slot(&self, name: &str) -> Slot {
        if let Some(slot) = self.slots.get(name) {
            return Arc::clone(slot.value());
        }
        Arc::clone(self.slots.entry(name.to_owned()).or_default().value())
    }
}
