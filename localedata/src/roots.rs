//! Process-wide storage root registry.
//!
//! Roots are searched in priority order: the most recently added global root
//! first, each engine's private root last.
//!
//! ```text
//! add_global_root("/overrides/b")
//! add_global_root("/overrides/a")
//!
//! effective roots for an engine with base path /pkg/locale:
//!   /overrides/a → /overrides/b → /pkg/locale
//! ```

use parking_lot::RwLock;
use tracing::debug;

/// Ordered list of global override roots.
#[derive(Debug, Default)]
pub struct RootRegistry {
    roots: RwLock<Vec<String>>,
}

impl RootRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root with the highest priority.
    ///
    /// Blank input is ignored. Adding a root that is already registered moves
    /// it to the front, so each root appears at most once.
    pub fn add(&self, root: &str) {
        let root = root.trim();
        if root.is_empty() {
            debug!("Ignoring blank global root");
            return;
        }
        let mut roots = self.roots.write();
        roots.retain(|r| r != root);
        roots.insert(0, root.to_string());
        debug!(root = %root, count = roots.len(), "Added global root");
    }

    /// Remove a root. Unknown or blank input is ignored.
    pub fn remove(&self, root: &str) {
        let root = root.trim();
        let mut roots = self.roots.write();
        if let Some(index) = roots.iter().position(|r| r == root) {
            roots.remove(index);
            debug!(root = %root, "Removed global root");
        }
    }

    /// Remove every global root.
    pub fn clear(&self) {
        self.roots.write().clear();
    }

    /// Snapshot of the global roots, highest priority first.
    pub fn snapshot(&self) -> Vec<String> {
        self.roots.read().clone()
    }

    /// Global roots followed by `private_root`.
    pub fn effective(&self, private_root: &str) -> Vec<String> {
        let roots = self.roots.read();
        let mut out = Vec::with_capacity(roots.len() + 1);
        out.extend(roots.iter().cloned());
        out.push(private_root.to_string());
        out
    }
}
