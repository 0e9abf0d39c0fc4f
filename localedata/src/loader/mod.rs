//! Loader adapters: fetch raw bytes for batches of candidate paths.
//!
//! The engine never touches storage directly. It hands the loader every
//! still-unresolved path for one root in a single batch and reads back one
//! slot per path:
//!
//! - `Some(bytes)`: the file exists
//! - `None`: the file does not exist
//!
//! Any other failure fails the whole batch.
//!
//! # Available Loaders
//!
//! - [`FsLoader`]: local filesystem, blocking (`std::fs`) and async (`tokio::fs`)
//! - [`MemoryLoader`]: in-memory files with call accounting

mod fs;
mod memory;

use std::future::Future;
use std::pin::Pin;

use crate::error::{LocaleDataError, Result};

pub use fs::FsLoader;
pub use memory::MemoryLoader;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Contents of one batch, index-aligned with the requested paths.
pub type Batch = Vec<Option<Vec<u8>>>;

/// Source of raw locale data files.
///
/// Implementations must be `Send + Sync`; one loader is shared by an engine
/// across all of its requests.
pub trait Loader: Send + Sync {
    /// Whether [`load_many_sync`](Self::load_many_sync) is available.
    fn supports_sync(&self) -> bool;

    /// Load every path, blocking the calling thread.
    ///
    /// The default implementation reports [`LocaleDataError::SyncUnsupported`].
    fn load_many_sync(&self, _paths: &[String]) -> Result<Batch> {
        Err(LocaleDataError::SyncUnsupported)
    }

    /// Load every path asynchronously.
    fn load_many<'a>(&'a self, paths: &'a [String]) -> BoxFuture<'a, Result<Batch>>;
}

/// Check that a batch has one slot per requested path.
pub(crate) fn check_batch(paths: &[String], batch: &Batch) -> Result<()> {
    if paths.len() == batch.len() {
        Ok(())
    } else {
        Err(LocaleDataError::LoaderBatch(format!(
            "requested {} paths, received {} results",
            paths.len(),
            batch.len()
        )))
    }
}
