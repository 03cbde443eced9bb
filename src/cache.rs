//! Parsed config files shared between resolutions.

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use dashmap::DashMap;
use tracing::trace;

use crate::resolver::LoadedConfig;

struct CacheEntry {
    modified: SystemTime,
    len: u64,
    config: Arc<LoadedConfig>,
}

/// Config files keyed by absolute path.
///
/// An entry is only returned while the file's modification time and length
/// are unchanged. Entries are replaced whole, so concurrent readers see either
/// the old or the new parse, never a mix.
#[derive(Default)]
pub struct ConfigCache {
    entries: DashMap<PathBuf, CacheEntry>,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub(crate) fn get(&self, path: &Path, metadata: &Metadata) -> Option<Arc<LoadedConfig>> {
        let modified = metadata.modified().ok()?;
        let entry = self.entries.get(path)?;

        if entry.modified == modified && entry.len == metadata.len() {
            trace!(path = %path.display(), "config cache hit");
            Some(Arc::clone(&entry.config))
        } else {
            trace!(path = %path.display(), "config cache stale");
            None
        }
    }

    pub(crate) fn insert(&self, path: &Path, metadata: &Metadata, config: Arc<LoadedConfig>) {
        // Platforms without mtimes cannot be validated, so nothing is cached.
        let Ok(modified) = metadata.modified() else {
            return;
        };

        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                modified,
                len: metadata.len(),
                config,
            },
        );
    }
}

impl std::fmt::Debug for ConfigCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}
