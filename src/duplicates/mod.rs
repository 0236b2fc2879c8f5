//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (phase 1)
//! - Checksum comparison within size groups (phase 2)
//! - Duplicate group and report types

pub mod finder;
pub mod groups;

pub use finder::{DetectionStats, DetectorConfig, DetectorError, DuplicateDetector};
pub use groups::{group_by_size, DuplicateGroup, DuplicateReport, GroupingStats};
