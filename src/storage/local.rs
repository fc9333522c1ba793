//! Local filesystem backend.
//!
//! Also the backend to use for distributed filesystems exposed through a
//! local mount (NFS, FUSE-mounted HDFS, ...).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{ReportStorage, StorageError};

#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

impl ReportStorage for LocalStorage {
    fn read_to_string(&self, path: &Path) -> Result<String, StorageError> {
        fs::read_to_string(path).map_err(|e| StorageError::io(path, e))
    }

    fn write(&self, path: &Path, content: &str) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
            }
        }

        // Readers never see a half-written report: write aside, then rename.
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, content).map_err(|e| StorageError::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| StorageError::io(path, e))?;

        debug!(path = %path.display(), bytes = content.len(), "wrote file");
        Ok(())
    }

    fn list(&self, folder: &Path) -> Result<Vec<PathBuf>, StorageError> {
        let entries = fs::read_dir(folder).map_err(|e| StorageError::io(folder, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(folder, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| StorageError::io(&entry.path(), e))?;
            if file_type.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    fn delete(&self, path: &Path) -> Result<(), StorageError> {
        fs::remove_file(path).map_err(|e| StorageError::io(path, e))?;
        debug!(path = %path.display(), "deleted file");
        Ok(())
    }

    fn exists(&self, path: &Path) -> Result<bool, StorageError> {
        path.try_exists().map_err(|e| StorageError::io(path, e))
    }
}
