use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use crate::error::{Error, Result};

/// Directories already created during one extraction.
///
/// The lock is held across `create_dir_all`, so concurrent writers that
/// share a parent create it once and none of them races ahead of it.
#[derive(Debug, Default)]
pub struct DirectoryCache {
    created: Mutex<HashSet<PathBuf>>,
}

impl DirectoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `dir` exists. Returns `true` when this call created it.
    pub async fn ensure(&self, dir: &Path) -> Result<bool> {
        let mut created = self.created.lock().await;
        if created.contains(dir) {
            return Ok(false);
        }

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| Error::FileWrite {
                path: dir.to_path_buf(),
                source,
            })?;
        created.insert(dir.to_path_buf());
        Ok(true)
    }

    pub async fn len(&self) -> usize {
        self.created.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.created.lock().await.is_empty()
    }
}
