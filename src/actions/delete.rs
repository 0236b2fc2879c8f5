//! File deletion with per-file failure isolation.
//!
//! Every selected file is attempted independently: a failure is reported to
//! the sink at error level and recorded in the [`BatchDeleteResult`], and the
//! batch carries on with the next file. Files are unlinked by default or
//! moved to the system trash with [`DeleteConfig::trash`].
//!
//! In duplicate mode only [`crate::duplicates::DuplicateGroup::copies`] are selected, so the
//! oldest member of every group survives.
//!
//! ```no_run
//! use fquery::actions::{delete_batch, DeleteConfig, StdoutSink};
//! use fquery::scanner::FileRecord;
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let records = vec![FileRecord::new(PathBuf::from("/tmp/old.log"), 10, SystemTime::now())];
//! let result = delete_batch(&records, &DeleteConfig::permanent(), &StdoutSink);
//! println!("{}", result.summary());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use log::Level;
use thiserror::Error;

use super::list::format_file_record;
use super::RecordSink;
use crate::duplicates::DuplicateReport;
use crate::scanner::FileRecord;

/// Errors that can occur while deleting a single file.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File does not exist (may have been deleted already)
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when trying to delete
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Trash operation failed
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed {
        /// Path of the file
        path: PathBuf,
        /// Error message from trash crate
        message: String,
    },

    /// Any other I/O failure
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path of the file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path of the file that could not be deleted.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) => p,
            Self::TrashFailed { path, .. } | Self::Io { path, .. } => path,
        }
    }
}

/// Result of a successful deletion.
#[derive(Debug, Clone)]
pub struct DeleteResult {
    /// Path of the deleted file
    pub path: PathBuf,
    /// Size of the deleted file in bytes
    pub size: u64,
    /// Whether the file was unlinked (true) or moved to trash (false)
    pub permanent: bool,
}

/// Outcome of a batch deletion.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteResult {
    /// Successfully deleted files
    pub successes: Vec<DeleteResult>,
    /// Failed deletions with error messages
    pub failures: Vec<(PathBuf, String)>,
    /// Total bytes freed
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// One-line human readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.all_succeeded() {
            format!(
                "Deleted {} file(s), freed {}",
                self.success_count(),
                ByteSize::b(self.bytes_freed)
            )
        } else {
            format!(
                "Deleted {} file(s), {} failed, freed {}",
                self.success_count(),
                self.failure_count(),
                ByteSize::b(self.bytes_freed)
            )
        }
    }
}

/// How files are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteConfig {
    /// Unlink files (true) or move them to the system trash (false)
    pub permanent: bool,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self::permanent()
    }
}

impl DeleteConfig {
    /// Unlink files.
    #[must_use]
    pub fn permanent() -> Self {
        Self { permanent: true }
    }

    /// Move files to the system trash.
    #[must_use]
    pub fn trash() -> Self {
        Self { permanent: false }
    }
}

/// Move a file to the system trash.
///
/// # Errors
///
/// Returns an error if the file is missing or the trash refuses it.
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::symlink_metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    trash::delete(path).map_err(|e| DeleteError::TrashFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    log::debug!("Moved to trash: {} ({} bytes)", path.display(), size);
    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        permanent: false,
    })
}

/// Unlink a file. This cannot be undone.
///
/// # Errors
///
/// Returns an error if the file is missing or cannot be removed.
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::symlink_metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    fs::remove_file(path).map_err(|e| DeleteError::from_io(path, e))?;

    log::debug!("Permanently deleted: {} ({} bytes)", path.display(), size);
    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        permanent: true,
    })
}

/// Delete one file the way `config` asks.
///
/// # Errors
///
/// See [`permanent_delete`] and [`delete_to_trash`].
pub fn delete_file(path: &Path, config: &DeleteConfig) -> Result<DeleteResult, DeleteError> {
    if config.permanent {
        permanent_delete(path)
    } else {
        delete_to_trash(path)
    }
}

/// Delete every record, isolating failures.
///
/// Each deleted file is reported to `sink` with the same line `list` would
/// print; each failure is reported at error level with its reason.
pub fn delete_batch(
    records: &[FileRecord],
    config: &DeleteConfig,
    sink: &dyn RecordSink,
) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();

    for record in records {
        match delete_file(&record.path, config) {
            Ok(deleted) => {
                sink.record(Level::Info, &format_file_record(record));
                result.bytes_freed += deleted.size;
                result.successes.push(deleted);
            }
            Err(e) => {
                let message = e.to_string();
                sink.record(
                    Level::Error,
                    &format!("failed to delete {}: {}", record.path.display(), message),
                );
                result.failures.push((record.path.clone(), message));
            }
        }
    }

    log::info!("{}", result.summary());
    result
}

/// Files to delete from a duplicate report: every member except the oldest
/// of each group.
#[must_use]
pub fn select_copies(report: &DuplicateReport) -> Vec<FileRecord> {
    report
        .iter()
        .flat_map(|group| group.copies())
        .cloned()
        .collect()
}
