//! Filename constraint: substring match plus extension include/exclude lists.

use super::Constraint;
use crate::scanner::FileRecord;

/// Plain configuration for a [`FilenameConstraint`].
///
/// Every field is optional; the default configuration accepts every file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilenameConstraintConfig {
    /// Substring the name portion (without extension) must contain.
    pub contains: Option<String>,
    /// Accepted extensions. Empty means no include restriction.
    pub include_extensions: Vec<String>,
    /// Rejected extensions. Empty means no exclude restriction.
    pub exclude_extensions: Vec<String>,
    /// Compare substring and extensions ignoring case.
    pub case_insensitive: bool,
}

/// Predicate over the file name of a [`FileRecord`].
///
/// The name is split at its last `.`: everything before is the name
/// portion, everything after is the extension. A name without any `.` has
/// no extension and therefore never passes an extension list, while a
/// substring-only constraint still sees the whole name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilenameConstraint {
    contains: Option<String>,
    include_extensions: Vec<String>,
    exclude_extensions: Vec<String>,
    case_insensitive: bool,
}

impl FilenameConstraint {
    /// Build a constraint from its configuration.
    ///
    /// Extensions may be given with or without a leading dot. In
    /// case-insensitive mode the substring and extensions are lower-cased
    /// once here instead of on every comparison.
    #[must_use]
    pub fn new(config: FilenameConstraintConfig) -> Self {
        let case_insensitive = config.case_insensitive;
        let fold = |s: String| {
            if case_insensitive {
                s.to_lowercase()
            } else {
                s
            }
        };
        let normalize_list = |list: Vec<String>| -> Vec<String> {
            list.into_iter()
                .map(|ext| fold(ext.strip_prefix('.').map(str::to_owned).unwrap_or(ext)))
                .collect()
        };

        Self {
            contains: config.contains.map(fold),
            include_extensions: normalize_list(config.include_extensions),
            exclude_extensions: normalize_list(config.exclude_extensions),
            case_insensitive,
        }
    }

    /// A constraint that accepts every file.
    #[must_use]
    pub fn accept_all() -> Self {
        Self::default()
    }

    fn has_name_constraint(&self) -> bool {
        self.contains.is_some()
    }

    fn has_extension_constraints(&self) -> bool {
        !self.include_extensions.is_empty() || !self.exclude_extensions.is_empty()
    }

    /// Whether this constraint restricts anything at all.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        !self.has_name_constraint() && !self.has_extension_constraints()
    }

    /// Evaluate the constraint against a bare file name.
    #[must_use]
    pub fn matches_name(&self, file_name: &str) -> bool {
        if self.is_unrestricted() {
            return true;
        }

        let (name, extension) = split_file_name(file_name);

        let name_ok = match &self.contains {
            None => true,
            Some(needle) if self.case_insensitive => name.to_lowercase().contains(needle.as_str()),
            Some(needle) => name.contains(needle.as_str()),
        };

        let extension_ok = !self.has_extension_constraints()
            || extension.is_some_and(|ext| {
                let ext = if self.case_insensitive {
                    ext.to_lowercase()
                } else {
                    ext.to_owned()
                };
                let excluded = self.exclude_extensions.iter().any(|e| *e == ext);
                let included = self.include_extensions.is_empty()
                    || self.include_extensions.iter().any(|e| *e == ext);
                !excluded && included
            });

        name_ok && extension_ok
    }
}

impl From<FilenameConstraintConfig> for FilenameConstraint {
    fn from(config: FilenameConstraintConfig) -> Self {
        Self::new(config)
    }
}

impl Constraint for FilenameConstraint {
    fn satisfies(&self, record: &FileRecord) -> bool {
        self.matches_name(&record.file_name())
    }
}

/// Split a file name at its last `.` into `(name, extension)`.
///
/// ```
/// use fquery::constraints::split_file_name;
///
/// assert_eq!(split_file_name("archive.tar.gz"), ("archive.tar", Some("gz")));
/// assert_eq!(split_file_name("Makefile"), ("Makefile", None));
/// assert_eq!(split_file_name(".bashrc"), ("", Some("bashrc")));
/// ```
#[must_use]
pub fn split_file_name(file_name: &str) -> (&str, Option<&str>) {
    match file_name.rsplit_once('.') {
        Some((name, extension)) => (name, Some(extension)),
        None => (file_name, None),
    }
}
