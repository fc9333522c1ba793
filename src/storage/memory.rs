//! In-memory backend, mostly for tests and dry runs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{ReportStorage, StorageError};

/// Map of path -> content. Clones share the same files.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: Arc<Mutex<BTreeMap<PathBuf, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files().keys().cloned().collect()
    }

    fn files(&self) -> MutexGuard<'_, BTreeMap<PathBuf, String>> {
        // A poisoned map is still a consistent map; nothing is half-updated.
        self.files.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ReportStorage for MemoryStorage {
    fn read_to_string(&self, path: &Path) -> Result<String, StorageError> {
        self.files()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                path: path.to_path_buf(),
            })
    }

    fn write(&self, path: &Path, content: &str) -> Result<(), StorageError> {
        self.files().insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn list(&self, folder: &Path) -> Result<Vec<PathBuf>, StorageError> {
        if !self.exists(folder)? {
            return Err(StorageError::NotFound {
                path: folder.to_path_buf(),
            });
        }
        Ok(self
            .files()
            .keys()
            .filter(|p| p.parent() == Some(folder))
            .cloned()
            .collect())
    }

    fn delete(&self, path: &Path) -> Result<(), StorageError> {
        self.files()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound {
                path: path.to_path_buf(),
            })
    }

    fn exists(&self, path: &Path) -> Result<bool, StorageError> {
        // Folders exist implicitly while they hold at least one file.
        Ok(self
            .files()
            .keys()
            .any(|p| p.starts_with(path)))
    }
}
