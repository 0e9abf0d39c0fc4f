//! Process-wide state shared by locale data engines.
//!
//! A [`DataContext`] bundles the global root list and the package cache
//! registry. Production code uses [`DataContext::global`]; tests build an
//! isolated context with [`DataContext::new`] so they never see each other's
//! roots or cached data.

use std::sync::{Arc, OnceLock};

use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheEntry, CacheRegistry, PackageCache};
use crate::fragment::FragmentSet;
use crate::locale::{Locale, StandardExpander, SublocaleExpander};
use crate::roots::RootRegistry;

/// Shared root registry and cache registry.
///
/// Cloning is cheap; clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct DataContext {
    roots: Arc<RootRegistry>,
    caches: Arc<CacheRegistry>,
}

impl DataContext {
    /// Create an isolated context.
    pub fn new() -> Self {
        Self::default()
    }

    /// The context shared by the whole process.
    pub fn global() -> &'static DataContext {
        static GLOBAL: OnceLock<DataContext> = OnceLock::new();
        GLOBAL.get_or_init(DataContext::new)
    }

    /// The global root registry.
    pub fn roots(&self) -> &RootRegistry {
        &self.roots
    }

    /// The package cache registry.
    pub fn caches(&self) -> &CacheRegistry {
        &self.caches
    }

    /// Get the cache for `package`, creating it on first use.
    pub fn cache_for(&self, package: &str) -> Arc<PackageCache> {
        self.caches.cache_for(package)
    }

    /// Add a global root with the highest priority. Blank input is ignored.
    pub fn add_global_root(&self, root: &str) {
        self.roots.add(root);
    }

    /// Remove a global root. Unknown or blank input is ignored.
    pub fn remove_global_root(&self, root: &str) {
        self.roots.remove(root);
    }

    /// Remove every global root.
    pub fn clear_global_roots(&self) {
        self.roots.clear();
    }

    /// Snapshot of the global roots, highest priority first.
    pub fn global_roots(&self) -> Vec<String> {
        self.roots.snapshot()
    }

    /// Inject data directly into a package cache.
    ///
    /// `data` maps locale tags to objects mapping basenames to values:
    ///
    /// ```json
    /// { "root": { "sysres": { ... } }, "de-DE": { "sysres": { ... } } }
    /// ```
    ///
    /// A `null` leaf records a negative entry. Anything that is not an object
    /// at either level is ignored.
    pub fn cache_data(&self, package: &str, data: &Value) {
        let Some(locales) = data.as_object() else {
            debug!(package = %package, "Ignoring non-object cache data");
            return;
        };
        let cache = self.cache_for(package);
        for (tag, basenames) in locales {
            let Some(basenames) = basenames.as_object() else {
                debug!(package = %package, locale = %tag, "Ignoring non-object locale data");
                continue;
            };
            let key = Locale::parse(tag).to_string();
            for (basename, value) in basenames {
                let entry = match value {
                    Value::Null => CacheEntry::Negative,
                    other => CacheEntry::Data(other.clone()),
                };
                cache.put(basename, &key, entry);
            }
            debug!(package = %package, locale = %key, count = basenames.len(), "Injected cache data");
        }
    }

    /// Check if any sublocale of `locale` more specific than root has a cache
    /// entry for `basename`.
    pub fn check_cache(&self, package: &str, locale: &str, basename: &str) -> bool {
        self.check_cache_with(&StandardExpander, package, locale, basename)
    }

    /// [`check_cache`](Self::check_cache) with a custom expander.
    pub fn check_cache_with(
        &self,
        expander: &dyn SublocaleExpander,
        package: &str,
        locale: &str,
        basename: &str,
    ) -> bool {
        let Some(cache) = self.caches.existing(package) else {
            return false;
        };
        FragmentSet::expand(expander, &Locale::parse(locale), basename)
            .iter()
            .filter(|f| !f.is_root())
            .any(|f| cache.contains(basename, &f.cache_key()))
    }

    /// Drop every cached entry of every package.
    pub fn clear_cache(&self) {
        self.caches.clear_all();
    }
}
