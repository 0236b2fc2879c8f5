//! Duplicate grouping and size-based file organization.
//!
//! # Overview
//!
//! This module provides the size-grouping phase of duplicate detection and
//! the result types produced by the checksum phase.
//!
//! ## Size Grouping
//!
//! Files with different sizes cannot be duplicates, so grouping by exact
//! size and discarding singleton groups leaves only the files that are worth
//! hashing. No file content is read in this phase.
//!
//! # Example
//!
//! ```
//! use fquery::scanner::FileRecord;
//! use fquery::duplicates::group_by_size;
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let files = vec![
//!     FileRecord::new(PathBuf::from("/file1.txt"), 1024, SystemTime::now()),
//!     FileRecord::new(PathBuf::from("/file2.txt"), 1024, SystemTime::now()),
//!     FileRecord::new(PathBuf::from("/file3.txt"), 2048, SystemTime::now()),
//! ];
//!
//! let (groups, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(groups.len(), 1);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::{hash_to_hex, FileRecord, Hash};

/// Confirmed duplicate group: two or more files with identical size and
/// identical content digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// BLAKE3 digest shared by every member
    pub hash: Hash,
    /// File size in bytes shared by every member
    pub size: u64,
    /// Members ordered by ascending modification time, then by path
    pub files: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    ///
    /// Members are sorted oldest first; equal timestamps fall back to path
    /// order so the result does not depend on hashing order.
    #[must_use]
    pub fn new(hash: Hash, size: u64, mut files: Vec<FileRecord>) -> Self {
        debug_assert!(files.iter().all(|f| f.size == size));
        files.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.path.cmp(&b.path)));
        Self { hash, size, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Checksum as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    /// The oldest member, kept when copies are removed.
    #[must_use]
    pub fn original(&self) -> Option<&FileRecord> {
        self.files.first()
    }

    /// Every member except the oldest.
    #[must_use]
    pub fn copies(&self) -> &[FileRecord] {
        self.files.get(1..).unwrap_or_default()
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Total wasted space (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Get just the paths of files in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

/// All duplicate groups found by one detection run.
///
/// Groups are ordered by size (largest first), then by checksum, so two runs
/// over the same files yield the same report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateReport {
    groups: Vec<DuplicateGroup>,
}

impl DuplicateReport {
    /// Build a report, dropping any group with fewer than two members.
    #[must_use]
    pub fn new(groups: impl IntoIterator<Item = DuplicateGroup>) -> Self {
        let mut groups: Vec<DuplicateGroup> = groups.into_iter().filter(|g| g.len() > 1).collect();
        groups.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.hash.cmp(&b.hash)));
        Self { groups }
    }

    /// Look up a group by its hex checksum.
    #[must_use]
    pub fn get(&self, checksum: &str) -> Option<&DuplicateGroup> {
        self.groups
            .iter()
            .find(|g| g.hash_hex().eq_ignore_ascii_case(checksum))
    }

    /// Iterate over the groups in presentation order.
    pub fn iter(&self) -> std::slice::Iter<'_, DuplicateGroup> {
        self.groups.iter()
    }

    /// The groups in presentation order.
    #[must_use]
    pub fn groups(&self) -> &[DuplicateGroup] {
        &self.groups
    }

    /// Number of duplicate groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no duplicates were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of files across all groups.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::len).sum()
    }

    /// Bytes that would be freed by keeping one file per group.
    #[must_use]
    pub fn reclaimable_space(&self) -> u64 {
        self.groups.iter().map(DuplicateGroup::wasted_space).sum()
    }
}

impl<'a> IntoIterator for &'a DuplicateReport {
    type Item = &'a DuplicateGroup;
    type IntoIter = std::slice::Iter<'a, DuplicateGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Statistics from size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of unique file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton groups)
    pub eliminated_unique: usize,
    /// Number of size groups with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by size (first phase of duplicate detection).
///
/// # Returns
///
/// A tuple of:
/// - `HashMap<u64, Vec<FileRecord>>` - Files grouped by size (only groups with 2+ files)
/// - `GroupingStats` - Statistics about the grouping operation
///
/// Empty files form an ordinary size-0 group: they all share the same
/// (empty) content.
///
/// # Example
///
/// ```
/// use fquery::scanner::FileRecord;
/// use fquery::duplicates::group_by_size;
/// use std::path::PathBuf;
/// use std::time::SystemTime;
///
/// let files = vec![
///     FileRecord::new(PathBuf::from("/a.txt"), 100, SystemTime::now()),
///     FileRecord::new(PathBuf::from("/b.txt"), 100, SystemTime::now()),
///     FileRecord::new(PathBuf::from("/c.txt"), 200, SystemTime::now()),
/// ];
///
/// let (groups, stats) = group_by_size(files);
///
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[&100].len(), 2);
/// assert_eq!(stats.eliminated_unique, 1);
/// ```
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileRecord>,
) -> (HashMap<u64, Vec<FileRecord>>, GroupingStats) {
    let mut all_groups: HashMap<u64, Vec<FileRecord>> = HashMap::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;
        all_groups.entry(file.size).or_default().push(file);
    }

    stats.unique_sizes = all_groups.len();

    let filtered_groups: HashMap<u64, Vec<FileRecord>> = all_groups
        .into_iter()
        .filter(|(size, files)| {
            if files.len() == 1 {
                stats.eliminated_unique += 1;
                log::trace!(
                    "Eliminated unique size {}: {}",
                    size,
                    files[0].path.display()
                );
                false
            } else {
                stats.potential_duplicates += files.len();
                stats.duplicate_groups += 1;
                log::debug!(
                    "Size group {} bytes: {} potential duplicates",
                    size,
                    files.len()
                );
                true
            }
        })
        .collect();

    log::info!(
        "Size grouping: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (filtered_groups, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn make_file(path: &str, size: u64) -> FileRecord {
        FileRecord::new(PathBuf::from(path), size, SystemTime::now())
    }

    fn make_file_at(path: &str, size: u64, secs: u64) -> FileRecord {
        FileRecord::new(
            PathBuf::from(path),
            size,
            SystemTime::UNIX_EPOCH + Duration::from_secs(secs),
        )
    }

    #[test]
    fn test_duplicate_group_orders_by_mtime() {
        let group = DuplicateGroup::new(
            [0u8; 32],
            10,
            vec![
                make_file_at("/newest", 10, 300),
                make_file_at("/oldest", 10, 100),
                make_file_at("/middle", 10, 200),
            ],
        );

        assert_eq!(
            group.paths(),
            vec![
                PathBuf::from("/oldest"),
                PathBuf::from("/middle"),
                PathBuf::from("/newest")
            ]
        );
        assert_eq!(group.original().unwrap().path, PathBuf::from("/oldest"));
        assert_eq!(group.copies().len(), 2);
    }

    #[test]
    fn test_duplicate_group_mtime_tie_breaks_on_path() {
        let group = DuplicateGroup::new(
            [0u8; 32],
            10,
            vec![make_file_at("/b", 10, 100), make_file_at("/a", 10, 100)],
        );

        assert_eq!(group.paths(), vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    }

    #[test]
    fn test_duplicate_group_wasted_space() {
        let group = DuplicateGroup::new(
            [0u8; 32],
            1000,
            vec![
                make_file("/a.txt", 1000),
                make_file("/b.txt", 1000),
                make_file("/c.txt", 1000),
            ],
        );

        assert_eq!(group.wasted_space(), 2000);
        assert_eq!(group.duplicate_count(), 2);
    }

    #[test]
    fn test_report_drops_singletons_and_orders_groups() {
        let mut small = [0u8; 32];
        small[0] = 1;
        let mut large = [0u8; 32];
        large[0] = 2;

        let report = DuplicateReport::new(vec![
            DuplicateGroup::new(small, 10, vec![make_file("/s1", 10), make_file("/s2", 10)]),
            DuplicateGroup::new([9u8; 32], 50, vec![make_file("/lonely", 50)]),
            DuplicateGroup::new(large, 100, vec![make_file("/l1", 100), make_file("/l2", 100)]),
        ]);

        assert_eq!(report.len(), 2);
        assert_eq!(report.groups()[0].size, 100);
        assert_eq!(report.groups()[1].size, 10);
        assert_eq!(report.file_count(), 4);
        assert_eq!(report.reclaimable_space(), 110);
    }

    #[test]
    fn test_report_lookup_by_checksum() {
        let mut hash = [0u8; 32];
        hash[0] = 0xAB;
        let group = DuplicateGroup::new(hash, 5, vec![make_file("/a", 5), make_file("/b", 5)]);
        let hex = group.hash_hex();
        let report = DuplicateReport::new(vec![group]);

        assert!(report.get(&hex).is_some());
        assert!(report.get(&hex.to_uppercase()).is_some());
        assert!(report.get("deadbeef").is_none());
    }

    #[test]
    fn test_group_by_size_empty_input() {
        let (groups, stats) = group_by_size(Vec::new());

        assert!(groups.is_empty());
        assert_eq!(stats, GroupingStats::default());
    }

    #[test]
    fn test_group_by_size_all_unique() {
        let files = vec![
            make_file("/a.txt", 100),
            make_file("/b.txt", 200),
            make_file("/c.txt", 300),
        ];
        let (groups, stats) = group_by_size(files);

        assert!(groups.is_empty());
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.unique_sizes, 3);
        assert_eq!(stats.eliminated_unique, 3);
        assert_eq!(stats.potential_duplicates, 0);
    }

    #[test]
    fn test_group_by_size_multiple_groups() {
        let files = vec![
            make_file("/a1.txt", 100),
            make_file("/a2.txt", 100),
            make_file("/b1.txt", 200),
            make_file("/b2.txt", 200),
            make_file("/b3.txt", 200),
            make_file("/c.txt", 300),
        ];
        let (groups, stats) = group_by_size(files);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&100].len(), 2);
        assert_eq!(groups[&200].len(), 3);
        assert_eq!(stats.total_size, 1000);
        assert_eq!(stats.eliminated_unique, 1);
        assert_eq!(stats.potential_duplicates, 5);
        assert_eq!(stats.duplicate_groups, 2);
    }

    #[test]
    fn test_group_by_size_keeps_empty_files() {
        let files = vec![
            make_file("/empty1.txt", 0),
            make_file("/empty2.txt", 0),
            make_file("/normal.txt", 100),
        ];
        let (groups, stats) = group_by_size(files);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[&0].len(), 2);
        assert_eq!(stats.eliminated_unique, 1);
    }

    #[test]
    fn test_grouping_stats_elimination_rate() {
        let files = vec![
            make_file("/a.txt", 100),
            make_file("/b.txt", 100),
            make_file("/c.txt", 200),
            make_file("/d.txt", 300),
        ];
        let (_, stats) = group_by_size(files);

        assert!((stats.elimination_rate() - 50.0).abs() < 0.1);
        assert_eq!(GroupingStats::default().elimination_rate(), 0.0);
    }
}
