//! In-memory loader.
//!
//! Serves files from a map keyed by full path. Useful for embedded data and
//! for observing exactly which paths the engine asks for.

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use super::{Batch, BoxFuture, Loader};
use crate::error::{LocaleDataError, Result};

/// Loader backed by an in-memory file map.
#[derive(Debug)]
pub struct MemoryLoader {
    files: RwLock<HashMap<String, Vec<u8>>>,
    failing: RwLock<HashSet<String>>,
    sync: bool,
    calls: AtomicUsize,
    sync_calls: AtomicUsize,
    async_calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl MemoryLoader {
    /// Create an empty loader supporting blocking reads.
    pub fn new() -> Self {
        Self::with_sync(true)
    }

    /// Create an empty loader that only supports async reads.
    pub fn async_only() -> Self {
        Self::with_sync(false)
    }

    fn with_sync(sync: bool) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            failing: RwLock::new(HashSet::new()),
            sync,
            calls: AtomicUsize::new(0),
            sync_calls: AtomicUsize::new(0),
            async_calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Add or replace a file.
    pub fn insert(&self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.write().insert(path.into(), contents.into());
    }

    /// Add or replace a file holding `value` serialized as JSON.
    pub fn insert_json(&self, path: impl Into<String>, value: &Value) {
        self.insert(path, value.to_string());
    }

    /// Remove a file.
    pub fn remove(&self, path: &str) {
        self.files.write().remove(path);
    }

    /// Make every batch containing `path` fail with an I/O error.
    pub fn fail_on(&self, path: impl Into<String>) {
        self.failing.write().insert(path.into());
    }

    /// Number of batch calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Number of batches served through the blocking path.
    pub fn sync_call_count(&self) -> usize {
        self.sync_calls.load(Ordering::Relaxed)
    }

    /// Number of batches served through the async path.
    pub fn async_call_count(&self) -> usize {
        self.async_calls.load(Ordering::Relaxed)
    }

    /// Every path requested so far, in request order.
    pub fn requested_paths(&self) -> Vec<String> {
        self.requested.lock().clone()
    }

    /// Reset call accounting.
    pub fn reset_stats(&self) {
        self.calls.store(0, Ordering::Relaxed);
        self.sync_calls.store(0, Ordering::Relaxed);
        self.async_calls.store(0, Ordering::Relaxed);
        self.requested.lock().clear();
    }

    fn serve(&self, paths: &[String]) -> Result<Batch> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.requested.lock().extend(paths.iter().cloned());

        let failing = self.failing.read();
        if let Some(path) = paths.iter().find(|p| failing.contains(*p)) {
            return Err(LocaleDataError::Loader {
                path: path.clone(),
                source: io::Error::other("simulated I/O failure"),
            });
        }

        let files = self.files.read();
        Ok(paths.iter().map(|p| files.get(p).cloned()).collect())
    }
}

impl Default for MemoryLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader for MemoryLoader {
    fn supports_sync(&self) -> bool {
        self.sync
    }

    fn load_many_sync(&self, paths: &[String]) -> Result<Batch> {
        if !self.sync {
            return Err(LocaleDataError::SyncUnsupported);
        }
        self.sync_calls.fetch_add(1, Ordering::Relaxed);
        self.serve(paths)
    }

    fn load_many<'a>(&'a self, paths: &'a [String]) -> BoxFuture<'a, Result<Batch>> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.async_calls.fetch_add(1, Ordering::Relaxed);
            self.serve(paths)
        })
    }
}
