//! Size constraint with exclusive min/max bounds and an exact size.

use super::Constraint;
use crate::scanner::FileRecord;

/// Predicate over the byte length of a [`FileRecord`].
///
/// `min` and `max` are exclusive bounds; `exact` requires equality. Absent
/// bounds take part in no comparison, and every present bound must hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeConstraint {
    min: Option<u64>,
    max: Option<u64>,
    exact: Option<u64>,
}

impl SizeConstraint {
    /// Build a normalized size constraint.
    ///
    /// When both bounds are given and `min > max`, the two are swapped so
    /// that the effective `min <= max`.
    ///
    /// ```
    /// use fquery::constraints::SizeConstraint;
    ///
    /// let c = SizeConstraint::new(Some(100), Some(50), None);
    /// assert_eq!(c.min(), Some(50));
    /// assert_eq!(c.max(), Some(100));
    /// ```
    #[must_use]
    pub fn new(min: Option<u64>, max: Option<u64>, exact: Option<u64>) -> Self {
        let (min, max) = match (min, max) {
            (Some(lo), Some(hi)) if lo > hi => {
                log::debug!("Size bounds reversed (min {} > max {}), swapping", lo, hi);
                (Some(hi), Some(lo))
            }
            bounds => bounds,
        };
        Self { min, max, exact }
    }

    /// A constraint that accepts every size.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Effective exclusive lower bound.
    #[must_use]
    pub fn min(&self) -> Option<u64> {
        self.min
    }

    /// Effective exclusive upper bound.
    #[must_use]
    pub fn max(&self) -> Option<u64> {
        self.max
    }

    /// Required exact size.
    #[must_use]
    pub fn exact(&self) -> Option<u64> {
        self.exact
    }

    /// Evaluate the constraint against a byte length.
    #[must_use]
    pub fn matches_size(&self, size: u64) -> bool {
        self.exact.is_none_or(|exact| size == exact)
            && self.min.is_none_or(|min| size > min)
            && self.max.is_none_or(|max| size < max)
    }
}

impl Constraint for SizeConstraint {
    fn satisfies(&self, record: &FileRecord) -> bool {
        self.matches_size(record.size)
    }
}
