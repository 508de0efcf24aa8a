//! Per-group counts and cumulative offsets.

use std::sync::Arc;

use super::{ConstantValueArray, DataArray, DataArrayExt, DataArrayHandle, NumericArray, RangeArray};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Layout {
    /// Every group has the same count; no table is stored.
    Uniform { entries: usize, count: i64 },
    /// `offsets.len() == entries + 1`, `offsets[0] == 0`.
    Offsets { offsets: Vec<i64>, min: i64, max: i64 },
}

/// Run-length table for variable-length groups such as polygon vertex lists.
///
/// `offset(k)` is the sum of the counts before group `k`; both `offset` and
/// `count` are O(1).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountArray {
    layout: Layout,
}

impl Default for CountArray {
    fn default() -> Self {
        Self::uniform(0, 0)
    }
}

impl CountArray {
    /// Build from explicit counts.
    pub fn new(counts: &[i64]) -> Self {
        let mut offsets = Vec::with_capacity(counts.len() + 1);
        offsets.push(0i64);
        let mut min = i64::MAX;
        let mut max = i64::MIN;
        let mut total = 0i64;
        for &c in counts {
            debug_assert!(c >= 0, "negative count {}", c);
            total += c;
            offsets.push(total);
            min = min.min(c);
            max = max.max(c);
        }
        if counts.is_empty() {
            min = 0;
            max = 0;
        }
        Self {
            layout: Layout::Offsets { offsets, min, max },
        }
    }

    /// Build from the first component of a counts array.
    pub fn from_counts(counts: &dyn DataArray) -> Self {
        let values: Vec<i64> = (0..counts.entries()).map(|i| counts.get_i64(i, 0)).collect();
        Self::new(&values)
    }

    /// `entries` groups of `count` each.
    pub fn uniform(entries: usize, count: i64) -> Self {
        Self {
            layout: Layout::Uniform { entries, count },
        }
    }

    /// Number of groups.
    pub fn entries(&self) -> usize {
        match &self.layout {
            Layout::Uniform { entries, .. } => *entries,
            Layout::Offsets { offsets, .. } => offsets.len() - 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries() == 0
    }

    /// Start of group `k`; `offset(entries())` is the total.
    #[inline]
    pub fn offset(&self, k: usize) -> i64 {
        debug_assert!(k <= self.entries());
        match &self.layout {
            Layout::Uniform { count, .. } => k as i64 * count,
            Layout::Offsets { offsets, .. } => offsets[k],
        }
    }

    #[inline]
    pub fn count(&self, k: usize) -> i64 {
        debug_assert!(k < self.entries());
        match &self.layout {
            Layout::Uniform { count, .. } => *count,
            Layout::Offsets { offsets, .. } => offsets[k + 1] - offsets[k],
        }
    }

    pub fn sum_counts(&self) -> i64 {
        self.offset(self.entries())
    }

    pub fn min_count(&self) -> i64 {
        match &self.layout {
            Layout::Uniform { entries: 0, .. } => 0,
            Layout::Uniform { count, .. } => *count,
            Layout::Offsets { min, .. } => *min,
        }
    }

    pub fn max_count(&self) -> i64 {
        match &self.layout {
            Layout::Uniform { entries: 0, .. } => 0,
            Layout::Uniform { count, .. } => *count,
            Layout::Offsets { max, .. } => *max,
        }
    }

    /// True when every group has the same count (all triangles, all quads, ...).
    pub fn is_uniform(&self) -> bool {
        self.min_count() == self.max_count()
    }

    /// Group containing the flattened position `global`.
    ///
    /// Empty groups never own a position.
    pub fn array_index(&self, global: i64) -> Option<usize> {
        if global < 0 || global >= self.sum_counts() {
            return None;
        }
        match &self.layout {
            Layout::Uniform { count, .. } => Some((global / count) as usize),
            Layout::Offsets { offsets, .. } => {
                Some(offsets.partition_point(|&o| o <= global) - 1)
            }
        }
    }

    /// Cumulative offsets as a data array of `entries() + 1` values.
    pub fn offsets_array(&self) -> DataArrayHandle {
        match &self.layout {
            Layout::Uniform { entries, count } if *count > 0 => Arc::new(RangeArray::with_step(
                0,
                (*entries as i64 + 1) * count,
                *count,
            )),
            Layout::Uniform { entries, .. } => {
                Arc::new(ConstantValueArray::scalar_value(entries + 1, 0i64))
            }
            Layout::Offsets { offsets, .. } => Arc::new(NumericArray::new(offsets.clone(), 1)),
        }
    }

    /// Per-group counts as a data array.
    pub fn counts_array(&self) -> DataArrayHandle {
        match &self.layout {
            Layout::Uniform { entries, count } => {
                Arc::new(ConstantValueArray::scalar_value(*entries, *count))
            }
            Layout::Offsets { offsets, .. } => Arc::new(NumericArray::new(
                offsets.windows(2).map(|w| w[1] - w[0]).collect::<Vec<i64>>(),
                1,
            )),
        }
    }

    /// `(offset, count)` for every group.
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        (0..self.entries()).map(move |k| (self.offset(k), self.count(k)))
    }

    /// Groups `start..start + length` as a new table, rebased to zero.
    pub fn slice(&self, start: usize, length: usize) -> Self {
        debug_assert!(start + length <= self.entries());
        match &self.layout {
            Layout::Uniform { count, .. } => Self::uniform(length, *count),
            Layout::Offsets { .. } => {
                let counts: Vec<i64> = (start..start + length).map(|k| self.count(k)).collect();
                Self::new(&counts)
            }
        }
    }
}
