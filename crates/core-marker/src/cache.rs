//! Process-wide marker cache (§4.F "Marker cache"; §9 redesign note: an
//! explicit `MarkerCache` value the application owns and shares, replacing
//! the ancestor's process-global singleton registry).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::vector::VectorMarker;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkerCacheKey {
    pub path: String,
    pub premultiplied: bool,
}

impl MarkerCacheKey {
    pub fn new(path: impl Into<String>, premultiplied: bool) -> Self {
        Self { path: path.into(), premultiplied }
    }
}

/// A shared, read-mostly cache of parsed `VectorMarker`s keyed by source
/// path. Callers construct one `MarkerCache` and pass it (by reference or
/// `Arc`) to every symbolizer invocation that needs marker lookup; nothing
/// here is a global.
#[derive(Debug, Default)]
pub struct MarkerCache {
    entries: RwLock<HashMap<MarkerCacheKey, Arc<VectorMarker>>>,
}

impl MarkerCache {
    pub fn new() -> Self {
        Self { entries: RwLock::new(HashMap::new()) }
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("marker cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cached marker for `key`, building it with `build` on a
    /// miss. Double-checked: a read lock is tried first so concurrent
    /// lookups of an already-populated key never contend on the write lock.
    pub fn get_or_insert_with(&self, key: MarkerCacheKey, build: impl FnOnce() -> VectorMarker) -> Arc<VectorMarker> {
        if let Some(hit) = self.entries.read().expect("marker cache lock poisoned").get(&key) {
            return Arc::clone(hit);
        }
        let mut entries = self.entries.write().expect("marker cache lock poisoned");
        if let Some(hit) = entries.get(&key) {
            return Arc::clone(hit);
        }
        let built = Arc::new(build());
        entries.insert(key, Arc::clone(&built));
        built
    }

    pub fn clear(&self) {
        self.entries.write().expect("marker cache lock poisoned").clear();
    }
}
