//! Report storage layer -- the capability trait, backends, and retention.
//!
//! The monitor never touches a filesystem directly. Everything it persists
//! goes through [`ReportStorage`], so a job can point it at local disk, a
//! mounted distributed filesystem, or an in-memory map in tests.

pub mod local;
pub mod memory;
pub mod retention;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use local::LocalStorage;
pub use memory::MemoryStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no such file: {path}")]
    NotFound { path: PathBuf },
}

impl StorageError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            StorageError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Minimal file capability the monitor needs from a storage backend.
///
/// Paths are interpreted by the backend. `list` returns the files directly
/// inside `folder` (full paths, sorted), not recursing into subfolders.
pub trait ReportStorage: Send + Sync {
    fn read_to_string(&self, path: &Path) -> Result<String, StorageError>;

    /// Write `content` to `path`, replacing any existing file and creating
    /// missing parent folders.
    fn write(&self, path: &Path, content: &str) -> Result<(), StorageError>;

    fn list(&self, folder: &Path) -> Result<Vec<PathBuf>, StorageError>;

    /// Delete a file. Deleting a missing file is an error.
    fn delete(&self, path: &Path) -> Result<(), StorageError>;

    /// True if `path` is an existing file or folder.
    fn exists(&self, path: &Path) -> Result<bool, StorageError>;
}

/// Outcome suffix used in persisted report names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Success,
    Failed,
    Ongoing,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 3] = [
        ReportStatus::Success,
        ReportStatus::Failed,
        ReportStatus::Ongoing,
    ];

    pub fn from_success(success: bool) -> Self {
        if success {
            ReportStatus::Success
        } else {
            ReportStatus::Failed
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            ReportStatus::Success => "success",
            ReportStatus::Failed => "failed",
            ReportStatus::Ongoing => "ongoing",
        }
    }

    /// Fixed alias name, e.g. `current.success`.
    pub fn current_name(&self) -> String {
        format!("{}.{}", retention::CURRENT_PREFIX, self.suffix())
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}
