//! Per-package locale data cache.
//!
//! Every resolution outcome is recorded here, including "checked, nothing
//! found". A missing key means the fragment was never checked; a
//! [`CacheEntry::Negative`] means it was checked and no root had data.
//!
//! # Sharing
//!
//! ```text
//! CacheRegistry
//!   ├── "ilib"        → Arc<PackageCache>  (shared by every engine for "ilib")
//!   └── "my-app"      → Arc<PackageCache>
//! ```
//!
//! Entries never expire. [`CacheRegistry::clear_all`] empties every package
//! cache in place, so engines holding an `Arc<PackageCache>` observe the clear.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::Value;

/// A cached resolution outcome for one `(basename, sublocale)` pair.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry {
    /// Data was found.
    Data(Value),
    /// The fragment was checked and no data exists.
    Negative,
}

impl CacheEntry {
    /// Check if this entry carries data.
    pub fn is_data(&self) -> bool {
        matches!(self, CacheEntry::Data(_))
    }

    /// Borrow the cached value, if any.
    pub fn value(&self) -> Option<&Value> {
        match self {
            CacheEntry::Data(value) => Some(value),
            CacheEntry::Negative => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    basename: String,
    sublocale: String,
}

impl CacheKey {
    fn new(basename: &str, sublocale: &str) -> Self {
        Self {
            basename: basename.to_string(),
            sublocale: sublocale.to_string(),
        }
    }
}

/// Point-in-time statistics of a package cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found an entry (positive or negative).
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Entries carrying data.
    pub data_entries: usize,
    /// Negative entries.
    pub negative_entries: usize,
}

impl CacheStats {
    /// Fraction of lookups answered by the cache.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Cache of locale data for a single package.
#[derive(Debug)]
pub struct PackageCache {
    package: String,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PackageCache {
    /// Create an empty cache for `package`.
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Package this cache belongs to.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Get the entry for `(basename, sublocale)`.
    ///
    /// `None` means the pair was never checked.
    pub fn get(&self, basename: &str, sublocale: &str) -> Option<CacheEntry> {
        self.entries
            .read()
            .get(&CacheKey::new(basename, sublocale))
            .cloned()
    }

    /// Like [`get`](Self::get), but counts the lookup in the statistics.
    pub(crate) fn lookup(&self, basename: &str, sublocale: &str) -> Option<CacheEntry> {
        let entry = self.get(basename, sublocale);
        if entry.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        entry
    }

    /// Store an entry, replacing any previous one.
    pub fn put(&self, basename: &str, sublocale: &str, entry: CacheEntry) {
        self.entries
            .write()
            .insert(CacheKey::new(basename, sublocale), entry);
    }

    /// Check if `(basename, sublocale)` has been recorded.
    pub fn contains(&self, basename: &str, sublocale: &str) -> bool {
        self.entries
            .read()
            .contains_key(&CacheKey::new(basename, sublocale))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the cache has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Remove every entry and reset statistics.
    pub fn clear(&self) {
        self.entries.write().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        let data_entries = entries.values().filter(|e| e.is_data()).count();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            data_entries,
            negative_entries: entries.len() - data_entries,
        }
    }
}

/// Registry of package caches, one per distinct package name.
#[derive(Debug, Default)]
pub struct CacheRegistry {
    caches: DashMap<String, Arc<PackageCache>>,
}

impl CacheRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cache for `package`, creating it on first use.
    ///
    /// The same package name always yields the same instance.
    pub fn cache_for(&self, package: &str) -> Arc<PackageCache> {
        self.caches
            .entry(package.to_string())
            .or_insert_with(|| Arc::new(PackageCache::new(package)))
            .clone()
    }

    /// Get the cache for `package` without creating it.
    pub fn existing(&self, package: &str) -> Option<Arc<PackageCache>> {
        self.caches.get(package).map(|c| Arc::clone(&c))
    }

    /// Names of packages that have a cache.
    pub fn packages(&self) -> Vec<String> {
        let mut names: Vec<String> = self.caches.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Drop every entry of every package cache.
    pub fn clear_all(&self) {
        for cache in self.caches.iter() {
            cache.value().clear();
        }
    }
}
