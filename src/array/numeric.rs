//! Owned packed numeric buffer.

use std::fmt;
use std::sync::Arc;

use super::{fill_generic, next_data_id, DataArray, DataArrayHandle};
use crate::util::{FillDest, Numeric, Scalar, Storage, TypeInfo};

/// Flat array of `T` components, `tuple_size` per entry.
///
/// The only array type that may be mutated, and only before it is shared.
#[derive(Clone)]
pub struct NumericArray<T: Numeric> {
    data: Vec<T>,
    tuple_size: usize,
    type_info: TypeInfo,
    data_id: i64,
}

impl<T: Numeric> NumericArray<T> {
    /// Wrap a tuple-major buffer. `data.len()` must be a multiple of `tuple_size`.
    pub fn new(data: Vec<T>, tuple_size: usize) -> Self {
        debug_assert!(tuple_size > 0);
        debug_assert_eq!(data.len() % tuple_size.max(1), 0);
        Self {
            data,
            tuple_size,
            type_info: TypeInfo::None,
            data_id: -1,
        }
    }

    /// `entries` tuples of zeros.
    pub fn zeroed(entries: usize, tuple_size: usize) -> Self {
        Self::new(vec![T::default(); entries * tuple_size], tuple_size)
    }

    /// Build from fixed-size tuples.
    pub fn from_tuples<const N: usize>(tuples: &[[T; N]]) -> Self {
        let data = tuples.iter().flat_map(|t| t.iter().copied()).collect();
        Self::new(data, N)
    }

    pub fn with_type_info(mut self, type_info: TypeInfo) -> Self {
        self.type_info = type_info;
        self
    }

    pub fn with_data_id(mut self, data_id: i64) -> Self {
        self.data_id = data_id;
        self
    }

    pub fn set_data_id(&mut self, data_id: i64) {
        self.data_id = data_id;
    }

    /// Stamp a fresh data id after modifying the contents.
    pub fn update_data_id(&mut self) {
        self.data_id = next_data_id();
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    pub fn tuple(&self, offset: usize) -> &[T] {
        let start = offset * self.tuple_size;
        &self.data[start..start + self.tuple_size]
    }

    #[inline]
    pub fn set(&mut self, offset: usize, idx: usize, value: T) {
        debug_assert!(idx < self.tuple_size);
        self.data[offset * self.tuple_size + idx] = value;
    }

    /// Append one tuple; missing components are zero.
    pub fn push_tuple(&mut self, tuple: &[T]) {
        for idx in 0..self.tuple_size {
            self.data.push(tuple.get(idx).copied().unwrap_or_default());
        }
    }

    /// Grow or shrink to `entries` tuples, zero-filling new ones.
    pub fn resize(&mut self, entries: usize) {
        self.data.resize(entries * self.tuple_size, T::default());
    }

    pub fn into_inner(self) -> Vec<T> {
        self.data
    }

    pub fn into_handle(self) -> DataArrayHandle {
        Arc::new(self)
    }
}

impl<T: Numeric> DataArray for NumericArray<T> {
    #[inline]
    fn entries(&self) -> usize {
        if self.tuple_size == 0 {
            0
        } else {
            self.data.len() / self.tuple_size
        }
    }

    #[inline]
    fn tuple_size(&self) -> usize {
        self.tuple_size
    }

    #[inline]
    fn storage(&self) -> Storage {
        T::STORAGE
    }

    fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    fn data_id(&self) -> i64 {
        self.data_id
    }

    fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + self.data.capacity() * std::mem::size_of::<T>()
    }

    #[inline]
    fn scalar(&self, offset: usize, idx: usize) -> Scalar {
        self.data[offset * self.tuple_size + idx].to_scalar()
    }

    fn fill_array(&self, dest: &mut FillDest<'_>, start: usize, length: usize, tsize: usize) {
        debug_assert!(start + length <= self.entries());
        let ts = self.tuple_size;
        match T::fill_slice(dest) {
            Some(out) if tsize == ts => {
                let src = &self.data[start * ts..(start + length) * ts];
                out[..src.len()].copy_from_slice(src);
            }
            Some(out) => {
                let n = ts.min(tsize);
                for i in 0..length {
                    let src = &self.data[(start + i) * ts..(start + i) * ts + n];
                    out[i * tsize..i * tsize + n].copy_from_slice(src);
                }
            }
            None => fill_generic(self, dest, start, length, tsize),
        }
    }

    fn backing_data(&self) -> Option<&[u8]> {
        Some(bytemuck::cast_slice(&self.data))
    }

    fn is_hardened(&self) -> bool {
        true
    }

    fn materialize(&self) -> DataArrayHandle {
        Arc::new(self.clone())
    }
}

impl<T: Numeric> fmt::Debug for NumericArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumericArray")
            .field("storage", &T::STORAGE)
            .field("entries", &self.entries())
            .field("tuple_size", &self.tuple_size)
            .field("type_info", &self.type_info)
            .finish()
    }
}
