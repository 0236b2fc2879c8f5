//! Duplicate detector implementation with two-phase grouping.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Size grouping**: Group files by exact size and drop singleton groups
//!    (see [`crate::duplicates::groups`])
//! 2. **Checksum grouping**: Hash every member of each surviving size group
//!    on a bounded thread pool, regroup by digest and drop singletons again
//!
//! Only files that already share a size are ever read, which keeps the I/O
//! cost proportional to the number of plausible duplicates.
//!
//! A file that cannot be hashed is left out of the result and reported in
//! [`DetectionStats::errors`]; it never ends up grouped with other failures.
//!
//! # Example
//!
//! ```no_run
//! use fquery::duplicates::DuplicateDetector;
//! use fquery::scanner::{FileRecord, Walker};
//! use std::path::Path;
//!
//! let files: Vec<FileRecord> = Walker::new(Path::new("."), true)
//!     .walk()
//!     .unwrap()
//!     .filter_map(Result::ok)
//!     .collect();
//!
//! let detector = DuplicateDetector::with_defaults();
//! let (report, stats) = detector.detect(files).unwrap();
//! println!("{} groups, {} failures", report.len(), stats.failed_files);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::groups::{group_by_size, DuplicateGroup, DuplicateReport};
use crate::progress::ProgressCallback;
use crate::scanner::{FileRecord, Hash, HashError, Hasher};

/// Threshold for logging large files (100 MiB).
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Configuration for the duplicate detector.
#[derive(Clone)]
pub struct DetectorConfig {
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for DetectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorConfig")
            .field("io_threads", &self.io_threads)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl DetectorConfig {
    /// Set the number of hashing threads (at least one).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Statistics from one detection run.
#[derive(Debug, Default)]
pub struct DetectionStats {
    /// Files handed to the detector
    pub input_files: usize,
    /// Files dropped because no other file had the same size
    pub eliminated_by_size: usize,
    /// Files successfully hashed
    pub hashed_files: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Files that could not be hashed
    pub failed_files: usize,
    /// Confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Duplicate files, excluding one original per group
    pub duplicate_files: usize,
    /// Bytes freed by keeping one file per group
    pub reclaimable_space: u64,
    /// Wall-clock duration of the run
    pub duration: Duration,
    /// Per-file hashing failures
    pub errors: Vec<HashError>,
}

/// Errors that abort a detection run.
#[derive(thiserror::Error, Debug)]
pub enum DetectorError {
    /// Shutdown was requested before hashing finished.
    #[error("Duplicate detection interrupted")]
    Interrupted,
}

/// Two-phase duplicate detector.
pub struct DuplicateDetector {
    config: DetectorConfig,
    hasher: Arc<Hasher>,
}

impl DuplicateDetector {
    /// Create a new duplicate detector with the given configuration.
    #[must_use]
    pub fn new(config: DetectorConfig) -> Self {
        let mut hasher = Hasher::new();
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(Arc::clone(flag));
        }
        Self {
            config,
            hasher: Arc::new(hasher),
        }
    }

    /// Create a new duplicate detector with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(DetectorConfig::default())
    }

    /// Find duplicate groups among `files`.
    ///
    /// Every group in the returned report has at least two members sharing
    /// both size and digest.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::Interrupted`] if shutdown is requested before
    /// hashing completes. No partial report is returned.
    pub fn detect(
        &self,
        files: impl IntoIterator<Item = FileRecord>,
    ) -> Result<(DuplicateReport, DetectionStats), DetectorError> {
        let start_time = Instant::now();

        let (size_groups, size_stats) = group_by_size(files);
        let mut stats = DetectionStats {
            input_files: size_stats.total_files,
            eliminated_by_size: size_stats.eliminated_unique,
            ..Default::default()
        };

        if self.config.is_shutdown_requested() {
            return Err(DetectorError::Interrupted);
        }

        let candidates: Vec<(u64, FileRecord)> = size_groups
            .into_iter()
            .flat_map(|(size, files)| files.into_iter().map(move |f| (size, f)))
            .collect();

        if candidates.is_empty() {
            log::info!("No files share a size, nothing to hash");
            stats.duration = start_time.elapsed();
            return Ok((DuplicateReport::default(), stats));
        }

        log::info!("Computing checksums for {} files", candidates.len());
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("checksum", candidates.len());
        }

        let hash_results = self.hash_all(candidates);

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("checksum");
        }

        if self.config.is_shutdown_requested() {
            log::info!("Checksum phase interrupted by shutdown signal");
            return Err(DetectorError::Interrupted);
        }

        // Single accumulation point for the parallel results. Keying by size
        // as well keeps a digest shared across size buckets from merging them.
        let mut checksum_groups: HashMap<(u64, Hash), Vec<FileRecord>> = HashMap::new();
        for (size, file, result) in hash_results {
            match result {
                Ok(hash) => {
                    stats.hashed_files += 1;
                    stats.bytes_hashed += file.size;
                    checksum_groups.entry((size, hash)).or_default().push(file);
                }
                Err(e) => {
                    stats.failed_files += 1;
                    stats.errors.push(e);
                }
            }
        }

        let report = DuplicateReport::new(
            checksum_groups
                .into_iter()
                .filter(|(_, files)| files.len() > 1)
                .map(|((size, hash), files)| {
                    log::debug!(
                        "Duplicate group {}: {} files, {} bytes each",
                        crate::scanner::hash_to_hex(&hash),
                        files.len(),
                        size
                    );
                    DuplicateGroup::new(hash, size, files)
                }),
        );

        stats.duplicate_groups = report.len();
        stats.duplicate_files = report.iter().map(DuplicateGroup::duplicate_count).sum();
        stats.reclaimable_space = report.reclaimable_space();
        stats.duration = start_time.elapsed();

        log::info!(
            "Duplicate detection complete: {} groups, {} duplicates, {} reclaimable, {} unreadable",
            stats.duplicate_groups,
            stats.duplicate_files,
            bytesize::ByteSize::b(stats.reclaimable_space),
            stats.failed_files
        );

        Ok((report, stats))
    }

    /// Hash every candidate on a pool limited to `io_threads`.
    fn hash_all(
        &self,
        candidates: Vec<(u64, FileRecord)>,
    ) -> Vec<(u64, FileRecord, Result<Hash, HashError>)> {
        let work = || {
            candidates
                .into_par_iter()
                .enumerate()
                .map(|(idx, (size, file))| {
                    let result = self.hash_one(idx, &file);
                    (size, file, result)
                })
                .collect::<Vec<_>>()
        };

        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads)
            .build()
        {
            Ok(pool) => pool.install(work),
            Err(e) => {
                log::warn!(
                    "Failed to create hashing thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                work()
            }
        }
    }

    fn hash_one(&self, idx: usize, file: &FileRecord) -> Result<Hash, HashError> {
        if self.config.is_shutdown_requested() {
            return Err(HashError::Interrupted(file.path.clone()));
        }

        if file.size > LARGE_FILE_THRESHOLD {
            log::debug!(
                "Hashing large file ({}): {}",
                bytesize::ByteSize::b(file.size),
                file.path.display()
            );
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_progress(idx + 1, file.path.to_string_lossy().as_ref());
        }

        match self.hasher.digest(&file.path) {
            Ok(hash) => {
                log::trace!("Checksum computed: {}", file.path.display());
                if let Some(ref callback) = self.config.progress_callback {
                    callback.on_item_completed(file.size);
                }
                Ok(hash)
            }
            Err(e) => {
                log::warn!("Failed to hash {}: {}", file.path.display(), e);
                Err(e)
            }
        }
    }
}
