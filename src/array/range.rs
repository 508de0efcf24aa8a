//! Arithmetic progression with no backing storage.

use super::{combine_data_ids, DataArray};
use crate::util::{Scalar, Storage, TypeInfo};

/// `start, start + step, ...` up to but excluding `end`.
///
/// Follows Python `range` semantics: a negative step counts down, and a
/// step pointing away from `end` yields an empty array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeArray {
    start: i64,
    end: i64,
    step: i64,
}

impl RangeArray {
    pub fn new(start: i64, end: i64) -> Self {
        Self::with_step(start, end, 1)
    }

    pub fn with_step(start: i64, end: i64, step: i64) -> Self {
        debug_assert!(step != 0, "range step must be non-zero");
        Self { start, end, step }
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn step(&self) -> i64 {
        self.step
    }
}

impl DataArray for RangeArray {
    fn entries(&self) -> usize {
        let pointing_at_end = match self.step {
            s if s > 0 => self.end > self.start,
            s if s < 0 => self.end < self.start,
            _ => false,
        };
        if !pointing_at_end {
            return 0;
        }
        let span = self.end.abs_diff(self.start);
        ((span - 1) / self.step.unsigned_abs() + 1) as usize
    }

    fn tuple_size(&self) -> usize {
        1
    }

    fn storage(&self) -> Storage {
        Storage::Int64
    }

    fn type_info(&self) -> TypeInfo {
        TypeInfo::Index
    }

    fn data_id(&self) -> i64 {
        combine_data_ids(&[], &[self.start as u64, self.end as u64, self.step as u64])
    }

    #[inline]
    fn scalar(&self, offset: usize, _idx: usize) -> Scalar {
        // every in-range value fits in i64, so wrapping lands on it exactly
        Scalar::Int(self.start.wrapping_add((offset as i64).wrapping_mul(self.step)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::DataArrayExt;

    #[test]
    fn test_ascending() {
        let r = RangeArray::new(3, 6);
        assert_eq!(r.entries(), 3);
        assert_eq!(r.fill_all::<i32>(), vec![3, 4, 5]);
    }

    #[test]
    fn test_descending() {
        let r = RangeArray::with_step(4, 0, -1);
        assert_eq!(r.fill_all::<i32>(), vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_uneven_step() {
        assert_eq!(RangeArray::with_step(0, 10, 3).fill_all::<i64>(), vec![0, 3, 6, 9]);
        assert_eq!(RangeArray::with_step(10, 0, -4).fill_all::<i64>(), vec![10, 6, 2]);
    }

    #[test]
    fn test_empty() {
        assert_eq!(RangeArray::new(5, 5).entries(), 0);
        assert_eq!(RangeArray::new(6, 3).entries(), 0);
        assert_eq!(RangeArray::with_step(0, 3, -1).entries(), 0);
    }

    #[test]
    fn test_extreme_bounds() {
        let full = RangeArray::new(i64::MIN, i64::MAX);
        assert_eq!(full.entries() as u64, u64::MAX);
        assert_eq!(full.get_i64(0, 0), i64::MIN);
        assert_eq!(full.get_i64(full.entries() - 1, 0), i64::MAX - 1);

        let down = RangeArray::with_step(i64::MAX, i64::MIN, i64::MIN);
        assert_eq!(down.entries(), 2);
        assert_eq!(down.fill_all::<i64>(), vec![i64::MAX, -1]);

        let wide = RangeArray::with_step(i64::MIN, i64::MAX, i64::MAX);
        assert_eq!(wide.fill_all::<i64>(), vec![i64::MIN, -1, i64::MAX - 1]);
        assert_eq!(RangeArray::with_step(0, 1, i64::MIN).entries(), 0);
    }

    #[test]
    fn test_formula() {
        let r = RangeArray::with_step(-7, 20, 5);
        for i in 0..r.entries() {
            assert_eq!(r.get_i64(i, 0), -7 + i as i64 * 5);
        }
    }
}
