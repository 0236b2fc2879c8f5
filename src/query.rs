//! Query orchestration: walker, constraints and duplicate detection.
//!
//! A [`Query`] is built once from a [`QueryConfig`] and is immutable apart
//! from its duplicate cache. [`Query::files`] streams the records that pass
//! the filter; [`Query::duplicates`] runs detection over that stream on first
//! use and returns the same report on every later call.
//!
//! # Example
//!
//! ```no_run
//! use fquery::constraints::FileFilter;
//! use fquery::query::{Query, QueryConfig};
//! use std::path::PathBuf;
//!
//! let query = Query::new(QueryConfig::new(PathBuf::from("."), FileFilter::default()).recursive(true));
//! for group in query.duplicates().unwrap() {
//!     println!("{} x{}", group.hash_hex(), group.len());
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, OnceLock};

use crate::constraints::{Constraint, FileFilter};
use crate::duplicates::{DetectionStats, DetectorConfig, DetectorError, DuplicateDetector, DuplicateReport};
use crate::scanner::{FileRecord, ScanError, Walker};

/// Errors that abort a query.
#[derive(thiserror::Error, Debug)]
pub enum QueryError {
    /// Directory traversal failed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Duplicate detection was stopped before completion.
    #[error(transparent)]
    Detector(#[from] DetectorError),
}

impl QueryError {
    /// Whether the query stopped because of a shutdown request.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(
            self,
            Self::Scan(ScanError::Interrupted) | Self::Detector(DetectorError::Interrupted)
        )
    }
}

/// Validated inputs of one selection operation.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Directory to select files from
    pub root: PathBuf,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Select duplicate groups instead of plain files
    pub duplicates: bool,
    /// Name and size constraints
    pub filter: FileFilter,
    /// Settings for the checksum phase
    pub detector: DetectorConfig,
}

impl QueryConfig {
    /// A shallow, non-duplicate query over `root`.
    #[must_use]
    pub fn new(root: PathBuf, filter: FileFilter) -> Self {
        Self {
            root,
            recursive: false,
            duplicates: false,
            filter,
            detector: DetectorConfig::default(),
        }
    }

    #[must_use]
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    #[must_use]
    pub fn duplicates(mut self, duplicates: bool) -> Self {
        self.duplicates = duplicates;
        self
    }

    #[must_use]
    pub fn with_detector(mut self, detector: DetectorConfig) -> Self {
        self.detector = detector;
        self
    }

    /// Share a shutdown flag with the walker and the checksum tasks.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.detector = self.detector.with_shutdown_flag(flag);
        self
    }
}

/// One selection operation over a directory.
#[derive(Debug)]
pub struct Query {
    config: QueryConfig,
    walker: Walker,
    duplicates: OnceLock<(DuplicateReport, DetectionStats)>,
}

impl Query {
    #[must_use]
    pub fn new(config: QueryConfig) -> Self {
        let mut walker = Walker::new(&config.root, config.recursive);
        if let Some(ref flag) = config.detector.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }
        Self {
            config,
            walker,
            duplicates: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Whether this query selects duplicate groups.
    #[must_use]
    pub fn is_duplicate_mode(&self) -> bool {
        self.config.duplicates
    }

    #[must_use]
    pub fn filter(&self) -> &FileFilter {
        &self.config.filter
    }

    /// Stream the files under the root that satisfy the filter.
    ///
    /// Every call starts a fresh traversal. Traversal errors are passed
    /// through so the caller can stop at the first one.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] if the root is missing, not a directory or
    /// unreadable.
    pub fn files(
        &self,
    ) -> Result<impl Iterator<Item = Result<FileRecord, ScanError>> + '_, ScanError> {
        let filter = &self.config.filter;
        Ok(self.walker.walk()?.filter(move |entry| match entry {
            Ok(record) => filter.satisfies(record),
            Err(_) => true,
        }))
    }

    /// Duplicate groups among the selected files.
    ///
    /// Computed on first call and cached for the life of the query. A failed
    /// computation caches nothing.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Scan`] on the first traversal error, and
    /// [`QueryError::Detector`] if shutdown interrupts the checksum phase.
    pub fn duplicates(&self) -> Result<&DuplicateReport, QueryError> {
        self.duplicates_with_stats().map(|(report, _)| report)
    }

    /// Like [`Query::duplicates`], also returning the detection statistics.
    ///
    /// # Errors
    ///
    /// See [`Query::duplicates`].
    pub fn duplicates_with_stats(&self) -> Result<(&DuplicateReport, &DetectionStats), QueryError> {
        if let Some((report, stats)) = self.duplicates.get() {
            log::trace!("Using cached duplicate result for {}", self.config.root.display());
            return Ok((report, stats));
        }

        let files = self.files()?.collect::<Result<Vec<_>, _>>()?;
        log::debug!("{} files selected for duplicate detection", files.len());

        let detector = DuplicateDetector::new(self.config.detector.clone());
        let computed = detector.detect(files)?;

        // A concurrent caller may have stored first; either result is equivalent.
        let (report, stats) = self.duplicates.get_or_init(|| computed);
        Ok((report, stats))
    }
}
