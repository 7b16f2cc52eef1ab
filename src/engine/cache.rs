//! Per-document range cache
//!
//! Computing ranges is a pure function of rule set and text, so hosts that
//! scan the same document repeatedly can key results by a document key and a
//! revision number and skip unchanged documents.

use crate::types::FoldingRange;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug)]
struct CachedRanges {
    revision: u64,
    ranges: Arc<Vec<FoldingRange>>,
}

/// Thread-safe cache of computed ranges
#[derive(Debug, Default)]
pub struct RangeCache {
    entries: RwLock<HashMap<String, CachedRanges>>,
}

impl RangeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached ranges for `key` at `revision`, computing them on a miss
    ///
    /// A different revision replaces the cached entry.
    pub fn get_or_compute<F>(&self, key: &str, revision: u64, compute: F) -> Arc<Vec<FoldingRange>>
    where
        F: FnOnce() -> Vec<FoldingRange>,
    {
        if let Some(ranges) = self.get(key, revision) {
            return ranges;
        }

        let ranges = Arc::new(compute());
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key.to_string(),
            CachedRanges {
                revision,
                ranges: Arc::clone(&ranges),
            },
        );
        ranges
    }

    /// Cached ranges for `key`, if present at exactly `revision`
    pub fn get(&self, key: &str, revision: u64) -> Option<Arc<Vec<FoldingRange>>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|cached| cached.revision == revision)
            .map(|cached| Arc::clone(&cached.ranges))
    }

    /// Forget the entry for `key`
    pub fn invalidate(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
