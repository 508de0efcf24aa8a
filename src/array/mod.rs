//! Data arrays - typed, tuple-valued sequences behind one interface.
//!
//! A data array holds `entries()` tuples of `tuple_size()` components of one
//! [`Storage`] kind. Flat arrays own a buffer; views forward every read through
//! an index mapping to other arrays:
//!
//! - [`NumericArray`] - owned packed buffer
//! - [`ConstantValueArray`] - one owned tuple repeated
//! - [`ConstantArray`] - one tuple of another array repeated
//! - [`IndirectArray`] - gather through an index array
//! - [`SubArray`] - contiguous slice of another array
//! - [`RangeArray`] - arithmetic progression, no storage
//! - [`RandomArray`] - seeded random values, no storage
//! - [`IndexedStringArray`] - codes into a shared [`StringTable`]
//! - [`ListArray`] - concatenation of arrays
//! - [`SelectionArray`] - sorted unique indices, sorted lazily
//! - [`CountArray`] - per-group counts and offsets (not itself a data array)
//!
//! Arrays are shared as [`DataArrayHandle`]s and never change once published.
//! Out-of-range offsets are only caught by debug assertions.

mod numeric;
mod constant;
mod indirect;
mod subarray;
mod range;
mod random;
mod string;
mod list;
mod count;
mod selection;

pub use numeric::NumericArray;
pub use constant::{ConstantArray, ConstantValueArray};
pub use indirect::{IndirectArray, DEFAULT_UNMAP_THRESHOLD};
pub use subarray::SubArray;
pub use range::RangeArray;
pub use random::RandomArray;
pub use string::{IndexedStringArray, StringTable, StringTableBuilder};
pub use list::ListArray;
pub use count::CountArray;
pub use selection::SelectionArray;

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use half::f16;

use crate::util::{FillDest, Numeric, Scalar, Storage, TypeInfo};

/// Shared handle to any data array.
pub type DataArrayHandle = Arc<dyn DataArray>;

/// Uniform read interface over every storage representation.
///
/// Implementations answer [`scalar`](DataArray::scalar) for numeric storage
/// and [`get_string`](DataArray::get_string) for string storage. Every typed
/// accessor in [`DataArrayExt`] is derived from those two reads, so any array
/// can be queried at any width.
pub trait DataArray: Send + Sync + fmt::Debug {
    /// Number of tuples.
    fn entries(&self) -> usize;

    /// Number of components per tuple.
    fn tuple_size(&self) -> usize;

    fn storage(&self) -> Storage;

    fn type_info(&self) -> TypeInfo {
        TypeInfo::None
    }

    /// Version of the contents. Negative means "always changed".
    fn data_id(&self) -> i64 {
        -1
    }

    fn is_valid(&self) -> bool {
        self.storage().is_valid()
    }

    /// Approximate bytes owned by this array, excluding shared inputs.
    fn memory_usage(&self) -> usize {
        std::mem::size_of_val(self)
    }

    /// Widest read of component `idx` of tuple `offset`.
    ///
    /// String arrays answer their string index, or zero.
    fn scalar(&self, offset: usize, idx: usize) -> Scalar;

    /// String component, for string storage.
    fn get_string(&self, _offset: usize, _idx: usize) -> Option<&str> {
        None
    }

    /// Index of a string component in the array's string table.
    fn string_index(&self, _offset: usize, _idx: usize) -> Option<usize> {
        None
    }

    /// String table backing an indexed string array.
    fn indexed_strings(&self) -> Option<&Arc<StringTable>> {
        None
    }

    /// Copy `length` tuples starting at `start` into `dest`.
    ///
    /// `dest` holds `length * tsize` components. Components past this array's
    /// tuple size are left untouched.
    fn fill_array(&self, dest: &mut FillDest<'_>, start: usize, length: usize, tsize: usize) {
        fill_generic(self, dest, start, length, tsize);
    }

    /// Raw bytes of a flat numeric buffer.
    fn backing_data(&self) -> Option<&[u8]> {
        None
    }

    /// `(indices, data)` when this array is a gather view.
    fn indirection(&self) -> Option<(&DataArrayHandle, &DataArrayHandle)> {
        None
    }

    /// True when the array owns all its data and needs no hardening.
    fn is_hardened(&self) -> bool {
        false
    }

    /// Build a flat owned copy of this array.
    fn materialize(&self) -> DataArrayHandle {
        flatten(self)
    }
}

/// Return a self-contained array with the same values.
///
/// Flat arrays are returned as-is; views are materialized, which breaks every
/// reference to their inputs.
pub fn harden(array: &DataArrayHandle) -> DataArrayHandle {
    if array.is_hardened() {
        Arc::clone(array)
    } else {
        array.materialize()
    }
}

static NEXT_DATA_ID: AtomicI64 = AtomicI64::new(1);

/// Hand out a fresh, monotonically increasing data id.
pub fn next_data_id() -> i64 {
    NEXT_DATA_ID.fetch_add(1, Ordering::Relaxed)
}

/// Mix `value` into `seed`.
#[inline]
pub fn hash_combine(seed: u64, value: u64) -> u64 {
    seed ^ value
        .wrapping_add(0x9e37_79b9_7f4a_7c15)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

/// Derive a view's data id from its input ids and mapping parameters.
///
/// Negative inputs poison the result.
pub fn combine_data_ids(ids: &[i64], params: &[u64]) -> i64 {
    if ids.iter().any(|&id| id < 0) {
        return -1;
    }
    let mut h = 0u64;
    for &id in ids {
        h = hash_combine(h, id as u64);
    }
    for &p in params {
        h = hash_combine(h, p);
    }
    (h & i64::MAX as u64) as i64
}

/// Element-by-element fill used by arrays without a faster path.
pub(crate) fn fill_generic<A: DataArray + ?Sized>(
    array: &A,
    dest: &mut FillDest<'_>,
    start: usize,
    length: usize,
    tsize: usize,
) {
    debug_assert!(start + length <= array.entries());
    debug_assert!(dest.len() >= length * tsize);
    let n = array.tuple_size().min(tsize);
    for i in 0..length {
        for j in 0..n {
            dest.set(i * tsize + j, array.scalar(start + i, j));
        }
    }
}

/// Run `$body` with `$T` bound to the component type of a numeric storage.
macro_rules! dispatch_numeric {
    ($storage:expr, $T:ident => $body:expr, _ => $fallback:expr) => {
        match $storage {
            $crate::util::Storage::Uint8 => {
                type $T = u8;
                $body
            }
            $crate::util::Storage::Int8 => {
                type $T = i8;
                $body
            }
            $crate::util::Storage::Uint16 => {
                type $T = u16;
                $body
            }
            $crate::util::Storage::Int16 => {
                type $T = i16;
                $body
            }
            $crate::util::Storage::Uint32 => {
                type $T = u32;
                $body
            }
            $crate::util::Storage::Int32 => {
                type $T = i32;
                $body
            }
            $crate::util::Storage::Uint64 => {
                type $T = u64;
                $body
            }
            $crate::util::Storage::Int64 => {
                type $T = i64;
                $body
            }
            $crate::util::Storage::Real16 => {
                type $T = half::f16;
                $body
            }
            $crate::util::Storage::Real32 => {
                type $T = f32;
                $body
            }
            $crate::util::Storage::Real64 => {
                type $T = f64;
                $body
            }
            _ => $fallback,
        }
    };
}
pub(crate) use dispatch_numeric;

/// Materialize any array into a flat numeric or indexed string array.
pub(crate) fn flatten<A: DataArray + ?Sized>(array: &A) -> DataArrayHandle {
    let entries = array.entries();
    let tuple_size = array.tuple_size();
    if array.storage().is_string() {
        let mut builder = StringTableBuilder::new();
        let mut codes = Vec::with_capacity(entries * tuple_size);
        for i in 0..entries {
            for j in 0..tuple_size {
                codes.push(match array.get_string(i, j) {
                    Some(s) => builder.intern(s) as i32,
                    None => -1,
                });
            }
        }
        let flat = IndexedStringArray::new(builder.build(), codes, tuple_size)
            .with_type_info(array.type_info())
            .with_data_id(array.data_id());
        return Arc::new(flat);
    }
    dispatch_numeric!(array.storage(), T => {
        let mut data = vec![T::default(); entries * tuple_size];
        array.fill_array(&mut T::fill_dest(&mut data), 0, entries, tuple_size);
        let flat: DataArrayHandle = Arc::new(
            NumericArray::new(data, tuple_size)
                .with_type_info(array.type_info())
                .with_data_id(array.data_id()),
        );
        flat
    }, _ => {
        let empty: DataArrayHandle = Arc::new(NumericArray::<i32>::new(Vec::new(), tuple_size.max(1)));
        empty
    })
}

/// Typed accessors and bulk helpers available on every data array.
pub trait DataArrayExt: DataArray {
    /// Read one component converted to `T`.
    #[inline]
    fn get<T: Numeric>(&self, offset: usize, idx: usize) -> T {
        debug_assert!(offset < self.entries(), "offset {} out of {}", offset, self.entries());
        debug_assert!(idx < self.tuple_size(), "component {} out of {}", idx, self.tuple_size());
        T::from_scalar(self.scalar(offset, idx))
    }

    #[inline]
    fn get_u8(&self, offset: usize, idx: usize) -> u8 {
        self.get(offset, idx)
    }
    #[inline]
    fn get_i8(&self, offset: usize, idx: usize) -> i8 {
        self.get(offset, idx)
    }
    #[inline]
    fn get_u16(&self, offset: usize, idx: usize) -> u16 {
        self.get(offset, idx)
    }
    #[inline]
    fn get_i16(&self, offset: usize, idx: usize) -> i16 {
        self.get(offset, idx)
    }
    #[inline]
    fn get_u32(&self, offset: usize, idx: usize) -> u32 {
        self.get(offset, idx)
    }
    #[inline]
    fn get_i32(&self, offset: usize, idx: usize) -> i32 {
        self.get(offset, idx)
    }
    #[inline]
    fn get_u64(&self, offset: usize, idx: usize) -> u64 {
        self.get(offset, idx)
    }
    #[inline]
    fn get_i64(&self, offset: usize, idx: usize) -> i64 {
        self.get(offset, idx)
    }
    #[inline]
    fn get_f16(&self, offset: usize, idx: usize) -> f16 {
        self.get(offset, idx)
    }
    #[inline]
    fn get_f32(&self, offset: usize, idx: usize) -> f32 {
        self.get(offset, idx)
    }
    #[inline]
    fn get_f64(&self, offset: usize, idx: usize) -> f64 {
        self.get(offset, idx)
    }

    /// Fill a typed slice; see [`DataArray::fill_array`].
    fn fill<T: Numeric>(&self, out: &mut [T], start: usize, length: usize, tsize: usize) {
        self.fill_array(&mut T::fill_dest(out), start, length, tsize);
    }

    /// Every component, tuple-major, converted to `T`.
    fn fill_all<T: Numeric>(&self) -> Vec<T> {
        let tsize = self.tuple_size();
        let mut out = vec![T::default(); self.entries() * tsize];
        self.fill(&mut out, 0, self.entries(), tsize);
        out
    }

    /// Read one tuple into `out`; extra slots in `out` are left untouched.
    fn import_tuple<T: Numeric>(&self, offset: usize, out: &mut [T]) {
        let n = out.len().min(self.tuple_size());
        for (idx, slot) in out.iter_mut().take(n).enumerate() {
            *slot = self.get(offset, idx);
        }
    }

    /// Min and max of one component, or None for empty or string arrays.
    fn compute_range(&self, idx: usize) -> Option<(f64, f64)> {
        if self.entries() == 0 || !self.storage().is_numeric() || idx >= self.tuple_size() {
            return None;
        }
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for i in 0..self.entries() {
            let v = self.scalar(i, idx).as_f64();
            lo = lo.min(v);
            hi = hi.max(v);
        }
        Some((lo, hi))
    }

    /// Element-wise comparison against another array of the same shape.
    fn is_equal(&self, other: &dyn DataArray) -> bool {
        if self.entries() != other.entries()
            || self.tuple_size() != other.tuple_size()
            || self.storage().is_string() != other.storage().is_string()
        {
            return false;
        }
        for i in 0..self.entries() {
            for j in 0..self.tuple_size() {
                let same = if self.storage().is_string() {
                    self.get_string(i, j) == other.get_string(i, j)
                } else {
                    self.scalar(i, j).same_value(other.scalar(i, j))
                };
                if !same {
                    return false;
                }
            }
        }
        true
    }

    /// All components as f64, tuple-major.
    fn to_f64_vec(&self) -> Vec<f64> {
        self.fill_all::<f64>()
    }

    /// All string components, tuple-major.
    fn to_strings(&self) -> Vec<Option<String>> {
        let mut out = Vec::with_capacity(self.entries() * self.tuple_size());
        for i in 0..self.entries() {
            for j in 0..self.tuple_size() {
                out.push(self.get_string(i, j).map(str::to_owned));
            }
        }
        out
    }
}

impl<A: DataArray + ?Sized> DataArrayExt for A {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_data_id_increases() {
        let a = next_data_id();
        let b = next_data_id();
        assert!(a >= 0);
        assert!(b > a);
    }

    #[test]
    fn test_combine_data_ids() {
        assert_eq!(combine_data_ids(&[3, -1], &[]), -1);
        let x = combine_data_ids(&[3, 4], &[0]);
        assert!(x >= 0);
        assert_eq!(x, combine_data_ids(&[3, 4], &[0]));
        assert_ne!(x, combine_data_ids(&[3, 4], &[1]));
    }

    #[test]
    fn test_any_width_on_any_storage() {
        let a = NumericArray::new(vec![1.5f32, -2.0, 300.0], 1);
        assert_eq!(a.get_i32(0, 0), 1);
        assert_eq!(a.get_i8(1, 0), -2);
        assert_eq!(a.get_u8(2, 0), 44);
        assert_eq!(a.get_f64(0, 0), 1.5);
        assert_eq!(a.get_f16(0, 0).to_f32(), 1.5);

        let b = NumericArray::new(vec![7u64], 1);
        assert_eq!(b.get_f32(0, 0), 7.0);
        assert_eq!(b.get_i16(0, 0), 7);
    }

    #[test]
    fn test_flatten_keeps_values() {
        let range: DataArrayHandle = Arc::new(RangeArray::new(2, 6));
        let flat = harden(&range);
        assert!(flat.is_hardened());
        assert!(flat.is_equal(range.as_ref()));
        assert_eq!(flat.storage(), range.storage());
    }

    #[test]
    fn test_is_equal_exact_for_wide_integers() {
        let big = 1u64 << 60;
        let a = NumericArray::new(vec![big], 1);
        assert!(!a.is_equal(&NumericArray::new(vec![big + 1], 1)));
        assert!(a.is_equal(&NumericArray::new(vec![big as i64], 1)));
        assert!(!NumericArray::new(vec![-1i64], 1).is_equal(&NumericArray::new(vec![u64::MAX], 1)));
    }

    #[test]
    fn test_harden_identity_for_flat() {
        let a: DataArrayHandle = Arc::new(NumericArray::new(vec![1i32, 2, 3], 1));
        let h = harden(&a);
        assert!(Arc::ptr_eq(&a, &h));
    }

    #[test]
    fn test_import_tuple_and_range() {
        let a = NumericArray::new(vec![1i32, 2, 3, -4, 5, 6], 3);
        let mut out = [0f32; 4];
        a.import_tuple(1, &mut out);
        assert_eq!(out, [-4.0, 5.0, 6.0, 0.0]);
        assert_eq!(a.compute_range(0), Some((-4.0, 1.0)));
        assert_eq!(a.compute_range(3), None);
    }
}
