//! Constraint evaluation for file selection.
//!
//! This module provides functionality for:
//! - Filename constraints (substring, extension include/exclude, case folding)
//! - Size constraints (exclusive min/max, exact size)
//! - [`FileFilter`], the conjunction of both, applied to every walked file
//!
//! Constraints are immutable after construction and evaluation is pure, so a
//! filter can be shared freely across threads.
//!
//! # Example
//!
//! ```
//! use fquery::constraints::{
//!     Constraint, FileFilter, FilenameConstraint, FilenameConstraintConfig, SizeConstraint,
//! };
//! use fquery::scanner::FileRecord;
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let filter = FileFilter::new(
//!     FilenameConstraint::new(FilenameConstraintConfig {
//!         include_extensions: vec!["log".to_string()],
//!         ..Default::default()
//!     }),
//!     SizeConstraint::new(Some(1024), None, None),
//! );
//!
//! let record = FileRecord::new(PathBuf::from("/var/log/app.log"), 4096, SystemTime::now());
//! assert!(filter.satisfies(&record));
//! ```

pub mod filename;
pub mod size;

pub use filename::{split_file_name, FilenameConstraint, FilenameConstraintConfig};
pub use size::SizeConstraint;

use crate::scanner::FileRecord;

/// A side-effect free predicate over file metadata.
pub trait Constraint: Send + Sync {
    /// Whether `record` satisfies this constraint.
    fn satisfies(&self, record: &FileRecord) -> bool;
}

/// Filename and size constraints combined with a logical AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileFilter {
    name: FilenameConstraint,
    size: SizeConstraint,
}

impl FileFilter {
    /// Combine a filename and a size constraint.
    #[must_use]
    pub fn new(name: FilenameConstraint, size: SizeConstraint) -> Self {
        Self { name, size }
    }

    /// The filename half of this filter.
    #[must_use]
    pub fn name(&self) -> &FilenameConstraint {
        &self.name
    }

    /// The size half of this filter.
    #[must_use]
    pub fn size(&self) -> &SizeConstraint {
        &self.size
    }
}

impl Constraint for FileFilter {
    fn satisfies(&self, record: &FileRecord) -> bool {
        let accepted = self.size.satisfies(record) && self.name.satisfies(record);
        if !accepted {
            log::trace!("Filtered out: {}", record.path.display());
        }
        accepted
    }
}
