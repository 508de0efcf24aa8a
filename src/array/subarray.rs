//! Zero-copy slice of another array.

use std::fmt;
use std::sync::Arc;

use super::{combine_data_ids, DataArray, DataArrayHandle, StringTable};
use crate::util::{FillDest, Scalar, Storage, TypeInfo};

/// Entries `start..start + length` of another array.
#[derive(Clone)]
pub struct SubArray {
    array: DataArrayHandle,
    start: usize,
    length: usize,
}

impl SubArray {
    pub fn new(array: DataArrayHandle, start: usize, length: usize) -> Self {
        debug_assert!(
            start + length <= array.entries(),
            "sub-array {}..{} out of {}",
            start,
            start + length,
            array.entries()
        );
        Self { array, start, length }
    }

    pub fn source(&self) -> &DataArrayHandle {
        &self.array
    }

    pub fn start(&self) -> usize {
        self.start
    }
}

impl DataArray for SubArray {
    fn entries(&self) -> usize {
        self.length
    }

    fn tuple_size(&self) -> usize {
        self.array.tuple_size()
    }

    fn storage(&self) -> Storage {
        self.array.storage()
    }

    fn type_info(&self) -> TypeInfo {
        self.array.type_info()
    }

    fn data_id(&self) -> i64 {
        combine_data_ids(&[self.array.data_id()], &[self.start as u64, self.length as u64])
    }

    fn is_valid(&self) -> bool {
        self.array.is_valid()
    }

    #[inline]
    fn scalar(&self, offset: usize, idx: usize) -> Scalar {
        self.array.scalar(self.start + offset, idx)
    }

    fn get_string(&self, offset: usize, idx: usize) -> Option<&str> {
        self.array.get_string(self.start + offset, idx)
    }

    fn string_index(&self, offset: usize, idx: usize) -> Option<usize> {
        self.array.string_index(self.start + offset, idx)
    }

    fn indexed_strings(&self) -> Option<&Arc<StringTable>> {
        self.array.indexed_strings()
    }

    fn fill_array(&self, dest: &mut FillDest<'_>, start: usize, length: usize, tsize: usize) {
        debug_assert!(start + length <= self.length);
        self.array.fill_array(dest, self.start + start, length, tsize);
    }
}

impl fmt::Debug for SubArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubArray")
            .field("start", &self.start)
            .field("length", &self.length)
            .field("array", &self.array)
            .finish()
    }
}
