//! Log folder retention and `current.*` alias handling.
//!
//! Persisted reports are named `<yyyyMMdd_HHmmss>.log.<status>`, so the
//! first eight characters of a name are its date. Aliases start with
//! [`CURRENT_PREFIX`] and are never purged.

use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{ReportStatus, ReportStorage, StorageError};

pub const CURRENT_PREFIX: &str = "current";

/// Default purge window, in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

const DATE_PREFIX_LEN: usize = 8;

/// Delete reports in `folder` dated strictly before `now - window_days`.
///
/// A folder that does not exist has nothing to purge. Files whose name does
/// not start with a `yyyyMMdd` date are left alone.
pub fn purge(
    storage: &dyn ReportStorage,
    folder: &Path,
    window_days: u32,
    now: NaiveDateTime,
) -> Result<Vec<PathBuf>, StorageError> {
    if !storage.exists(folder)? {
        debug!(folder = %folder.display(), "log folder missing, nothing to purge");
        return Ok(Vec::new());
    }

    let Some(cutoff) = now.date().checked_sub_days(Days::new(u64::from(window_days))) else {
        return Ok(Vec::new());
    };

    let mut deleted = Vec::new();
    for path in storage.list(folder)? {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with(CURRENT_PREFIX) {
            continue;
        }

        match log_date(name) {
            Some(date) if date < cutoff => {
                storage.delete(&path)?;
                deleted.push(path);
            }
            Some(_) => {}
            None => {
                warn!(file = %name, "skipping file without a yyyyMMdd prefix");
            }
        }
    }

    info!(
        folder = %folder.display(),
        window_days,
        %cutoff,
        deleted = deleted.len(),
        "purged old reports"
    );
    Ok(deleted)
}

/// Date encoded in the leading `yyyyMMdd` of a report name.
pub fn log_date(name: &str) -> Option<NaiveDate> {
    let prefix = name.get(..DATE_PREFIX_LEN)?;
    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(prefix, "%Y%m%d").ok()
}

/// Remove every `current.*` alias in `folder`. Returns how many existed.
pub fn clear_current(storage: &dyn ReportStorage, folder: &Path) -> Result<usize, StorageError> {
    let mut removed = 0;
    for status in ReportStatus::ALL {
        let path = folder.join(status.current_name());
        if storage.exists(&path)? {
            storage.delete(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// The report a `current.*` alias points at.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentReport {
    pub status: ReportStatus,
    pub path: PathBuf,
    pub content: String,
}

/// Read whichever `current.*` alias exists in `folder`.
///
/// A finished status wins over `ongoing` should both be present.
pub fn current_report(
    storage: &dyn ReportStorage,
    folder: &Path,
) -> Result<Option<CurrentReport>, StorageError> {
    for status in ReportStatus::ALL {
        let path = folder.join(status.current_name());
        if storage.exists(&path)? {
            let content = storage.read_to_string(&path)?;
            return Ok(Some(CurrentReport {
                status,
                path,
                content,
            }));
        }
    }
    Ok(None)
}
