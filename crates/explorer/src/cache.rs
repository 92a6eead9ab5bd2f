//! Content-addressed memoization of normalized tables.
//!
//! The merged table is a pure function of the workbook bytes, so identical
//! blobs can share one computed table. The cache is an in-process memo
//! keyed by a fingerprint of the content: entries are never mutated, and a
//! changed blob simply lands on a different key and is recomputed.

use crate::error::Result;
use crate::explore;
use crate::reconcile::MergedTable;
use awardbook_table::Book;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::debug;

/// Cache of merged tables keyed by workbook content identity.
#[derive(Debug, Default)]
pub struct TableCache {
    entries: HashMap<u64, Arc<MergedTable>>,
}

impl TableCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fingerprint a workbook blob by content.
    #[must_use]
    pub fn fingerprint(bytes: &[u8]) -> u64 {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        hasher.finish()
    }

    /// Return the merged table for this blob, computing it on first sight.
    ///
    /// Repeated calls with byte-identical blobs return the same shared
    /// table. Errors are not cached; a failing workbook is re-attempted on
    /// the next call.
    pub fn load_or_insert(&mut self, bytes: &[u8]) -> Result<Arc<MergedTable>> {
        let key = Self::fingerprint(bytes);
        if let Some(table) = self.entries.get(&key) {
            debug!(key, "merged table cache hit");
            return Ok(Arc::clone(table));
        }

        let book = Book::from_xlsx_bytes(bytes)?;
        let table = Arc::new(explore(&book)?);
        self.entries.insert(key, Arc::clone(&table));
        debug!(key, rows = table.row_count(), "merged table cached");
        Ok(table)
    }

    /// Number of cached tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all cached tables.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_tracks_content() {
        assert_eq!(
            TableCache::fingerprint(b"same bytes"),
            TableCache::fingerprint(b"same bytes")
        );
        assert_ne!(
            TableCache::fingerprint(b"one workbook"),
            TableCache::fingerprint(b"another workbook")
        );
    }

    #[test]
    fn test_errors_are_not_cached() {
        let mut cache = TableCache::new();
        assert!(cache.load_or_insert(b"not an xlsx container").is_err());
        assert!(cache.is_empty());
    }
}
