//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for lazily traversing a
//! directory and yielding metadata for the regular files below it.
//!
//! # Features
//!
//! - Shallow (immediate children) or fully recursive traversal
//! - Regular files only: directories, symlinks and special files are skipped
//! - Deterministic order (entries sorted by file name)
//! - Root validation before the first entry is produced
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use fquery::scanner::{FileRecord, Walker};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), false);
//! let files: Vec<FileRecord> = walker
//!     .walk()
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use walkdir::{DirEntry, WalkDir};

use super::{FileRecord, ScanError};

/// Lazy, one-shot directory walker.
#[derive(Debug, Clone)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Descend into subdirectories (unlimited depth) when true
    recursive: bool,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory to scan
    /// * `recursive` - Whether to descend into subdirectories
    #[must_use]
    pub fn new(path: &Path, recursive: bool) -> Self {
        Self {
            root: path.to_path_buf(),
            recursive,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker yields
    /// [`ScanError::Interrupted`] instead of the next entry.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Root directory of this walker.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Check that the root exists, is a directory and can be listed.
    fn validate_root(&self) -> Result<(), ScanError> {
        let metadata = fs::metadata(&self.root).map_err(|e| ScanError::from_io(&self.root, e))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }
        fs::read_dir(&self.root).map_err(|e| ScanError::from_io(&self.root, e))?;
        Ok(())
    }

    /// Walk the directory tree, yielding file records.
    ///
    /// Nothing is read beyond the root check until the iterator is advanced.
    /// Errors met during the walk are yielded in place; callers treat them
    /// as fatal for the whole query.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] if the root does not exist, is not a directory
    /// or cannot be read.
    pub fn walk(&self) -> Result<impl Iterator<Item = Result<FileRecord, ScanError>> + '_, ScanError> {
        self.validate_root()?;

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        log::debug!(
            "Walking {} ({})",
            self.root.display(),
            if self.recursive { "recursive" } else { "shallow" }
        );

        let walk_dir = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(false)
            .sort_by_file_name();

        Ok(walk_dir.into_iter().filter_map(move |entry_result| {
            if self.is_shutdown_requested() {
                log::debug!("Walker: Shutdown requested, stopping iteration");
                return Some(Err(ScanError::Interrupted));
            }

            match entry_result {
                Ok(entry) => self.process_entry(&entry),
                Err(e) => Some(Err(self.convert_walk_error(e))),
            }
        }))
    }

    /// Turn a directory entry into a record if it is a regular file.
    fn process_entry(&self, entry: &DirEntry) -> Option<Result<FileRecord, ScanError>> {
        let file_type = entry.file_type();
        if !file_type.is_file() {
            if file_type.is_symlink() {
                log::trace!("Skipping symlink: {}", entry.path().display());
            }
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                let path = entry.path().to_path_buf();
                return Some(Err(self.convert_walk_error_at(path, e)));
            }
        };

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        Some(Ok(FileRecord::new(
            entry.path().to_path_buf(),
            metadata.len(),
            modified,
        )))
    }

    fn convert_walk_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        self.convert_walk_error_at(path, error)
    }

    fn convert_walk_error_at(&self, path: PathBuf, error: walkdir::Error) -> ScanError {
        log::warn!("Walker error for {}: {}", path.display(), error);
        let message = error.to_string();
        match error.into_io_error() {
            Some(io_error) => ScanError::from_io(&path, io_error),
            None => ScanError::Io {
                path,
                source: io::Error::other(message),
            },
        }
    }
}
