//! Filesystem loader.
//!
//! Blocking reads go through `std::fs`, async reads through `tokio::fs`.
//! `NotFound` maps to a missing slot; every other I/O error fails the batch.

use std::io;

use futures::future::try_join_all;
use tracing::trace;

use super::{Batch, BoxFuture, Loader};
use crate::error::{LocaleDataError, Result};

/// Loader reading locale data files from the local filesystem.
#[derive(Debug, Clone)]
pub struct FsLoader {
    sync: bool,
}

impl FsLoader {
    /// Create a loader supporting both blocking and async reads.
    pub fn new() -> Self {
        Self { sync: true }
    }

    /// Create a loader that only supports async reads.
    pub fn async_only() -> Self {
        Self { sync: false }
    }
}

impl Default for FsLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_result(path: &str, result: io::Result<Vec<u8>>) -> Result<Option<Vec<u8>>> {
    match result {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(LocaleDataError::Loader {
            path: path.to_string(),
            source,
        }),
    }
}

impl Loader for FsLoader {
    fn supports_sync(&self) -> bool {
        self.sync
    }

    fn load_many_sync(&self, paths: &[String]) -> Result<Batch> {
        if !self.sync {
            return Err(LocaleDataError::SyncUnsupported);
        }
        trace!(count = paths.len(), "Reading batch");
        paths
            .iter()
            .map(|path| read_result(path, std::fs::read(path)))
            .collect()
    }

    fn load_many<'a>(&'a self, paths: &'a [String]) -> BoxFuture<'a, Result<Batch>> {
        Box::pin(async move {
            trace!(count = paths.len(), "Reading batch asynchronously");
            try_join_all(
                paths
                    .iter()
                    .map(|path| async move { read_result(path, tokio::fs::read(path).await) }),
            )
            .await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Vec<String>) {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("present.json");
        std::fs::write(&present, b"{\"a\":1}").unwrap();
        let missing = dir.path().join("missing.json");
        let paths = vec![
            present.to_string_lossy().into_owned(),
            missing.to_string_lossy().into_owned(),
        ];
        (dir, paths)
    }

    #[test]
    fn test_sync_read_maps_missing_to_none() {
        let (_dir, paths) = setup();
        let batch = FsLoader::new().load_many_sync(&paths).unwrap();
        assert_eq!(batch, vec![Some(b"{\"a\":1}".to_vec()), None]);
    }

    #[tokio::test]
    async fn test_async_read_maps_missing_to_none() {
        let (_dir, paths) = setup();
        let batch = FsLoader::new().load_many(&paths).await.unwrap();
        assert_eq!(batch, vec![Some(b"{\"a\":1}".to_vec()), None]);
    }

    #[test]
    fn test_async_only_rejects_sync_reads() {
        let (_dir, paths) = setup();
        let loader = FsLoader::async_only();
        assert!(!loader.supports_sync());
        assert!(matches!(
            loader.load_many_sync(&paths),
            Err(LocaleDataError::SyncUnsupported)
        ));
    }

    #[test]
    fn test_directory_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let paths = vec![dir.path().to_string_lossy().into_owned()];
        let err = FsLoader::new().load_many_sync(&paths).unwrap_err();
        assert!(err.is_loader_error());
    }
}
