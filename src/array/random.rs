//! Seeded random values computed on demand.

use super::{combine_data_ids, DataArray};
use crate::util::{Scalar, Storage, TypeInfo};

/// Deterministic pseudo-random `fpreal32` values in `[min, max)`.
///
/// Each component is a pure function of `(seed, offset, idx)`, so reads are
/// O(1), repeatable, and need no storage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomArray {
    seed: u64,
    entries: usize,
    tuple_size: usize,
    min: f64,
    max: f64,
}

impl RandomArray {
    /// Values in `[0, 1)`.
    pub fn new(seed: u64, entries: usize, tuple_size: usize) -> Self {
        Self::with_range(seed, entries, tuple_size, 0.0, 1.0)
    }

    pub fn with_range(seed: u64, entries: usize, tuple_size: usize, min: f64, max: f64) -> Self {
        debug_assert!(tuple_size > 0);
        Self {
            seed,
            entries,
            tuple_size,
            min,
            max,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform value in `[0, 1)` for one component.
    #[inline]
    fn unit(&self, offset: usize, idx: usize) -> f64 {
        let key = (offset as u64)
            .wrapping_mul(self.tuple_size as u64)
            .wrapping_add(idx as u64);
        let bits = splitmix64(self.seed ^ splitmix64(key));
        // top 53 bits fill the mantissa exactly
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

#[inline]
fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

impl DataArray for RandomArray {
    fn entries(&self) -> usize {
        self.entries
    }

    fn tuple_size(&self) -> usize {
        self.tuple_size
    }

    fn storage(&self) -> Storage {
        Storage::Real32
    }

    fn type_info(&self) -> TypeInfo {
        TypeInfo::None
    }

    fn data_id(&self) -> i64 {
        combine_data_ids(
            &[],
            &[
                self.seed,
                self.entries as u64,
                self.tuple_size as u64,
                self.min.to_bits(),
                self.max.to_bits(),
            ],
        )
    }

    #[inline]
    fn scalar(&self, offset: usize, idx: usize) -> Scalar {
        let v = self.min + (self.max - self.min) * self.unit(offset, idx);
        // answer exactly what an fpreal32 buffer would hold
        Scalar::Real(v as f32 as f64)
    }
}
