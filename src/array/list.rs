//! Concatenation of several arrays into one.

use std::fmt;
use std::sync::Arc;

use super::{combine_data_ids, CountArray, DataArray, DataArrayHandle, StringTable};
use crate::util::{Error, FillDest, Result, Scalar, Storage, TypeInfo};

/// Arrays laid end to end.
///
/// A read at global offset `i` is forwarded to the sub-array owning `i` at
/// local offset `i - offset(k)`, found by binary search over the cumulative
/// entry counts.
#[derive(Clone)]
pub struct ListArray {
    arrays: Vec<DataArrayHandle>,
    counts: CountArray,
    storage: Storage,
    tuple_size: usize,
}

impl ListArray {
    /// Concatenate `arrays`. All must share a tuple size and a storage family.
    pub fn new(arrays: Vec<DataArrayHandle>) -> Result<Self> {
        let first = arrays.first().ok_or(Error::EmptyList)?;
        let tuple_size = first.tuple_size();
        let mut storage = first.storage();
        for array in &arrays[1..] {
            if array.tuple_size() != tuple_size {
                return Err(Error::TupleSizeMismatch {
                    expected: tuple_size,
                    actual: array.tuple_size(),
                });
            }
            let promoted = storage.promote(array.storage());
            if !promoted.is_valid() {
                return Err(Error::StorageMismatch {
                    expected: storage,
                    actual: array.storage(),
                });
            }
            storage = promoted;
        }
        let entries: Vec<i64> = arrays.iter().map(|a| a.entries() as i64).collect();
        Ok(Self {
            counts: CountArray::new(&entries),
            arrays,
            storage,
            tuple_size,
        })
    }

    pub fn arrays(&self) -> &[DataArrayHandle] {
        &self.arrays
    }

    /// Cumulative entry counts of the sub-arrays.
    pub fn counts(&self) -> &CountArray {
        &self.counts
    }

    /// `(sub-array, local offset)` for a global offset.
    #[inline]
    pub fn locate(&self, offset: usize) -> (usize, usize) {
        let k = self.counts.array_index(offset as i64);
        debug_assert!(k.is_some(), "list offset {} out of {}", offset, self.counts.sum_counts());
        let k = k.unwrap_or(self.arrays.len() - 1);
        (k, offset - self.counts.offset(k) as usize)
    }
}

impl DataArray for ListArray {
    fn entries(&self) -> usize {
        self.counts.sum_counts() as usize
    }

    fn tuple_size(&self) -> usize {
        self.tuple_size
    }

    fn storage(&self) -> Storage {
        self.storage
    }

    fn type_info(&self) -> TypeInfo {
        self.arrays[0].type_info()
    }

    fn data_id(&self) -> i64 {
        let ids: Vec<i64> = self.arrays.iter().map(|a| a.data_id()).collect();
        combine_data_ids(&ids, &[self.arrays.len() as u64])
    }

    fn is_valid(&self) -> bool {
        self.arrays.iter().all(|a| a.is_valid())
    }

    fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.arrays.capacity() * std::mem::size_of::<DataArrayHandle>()
            + (self.counts.entries() + 1) * std::mem::size_of::<i64>()
    }

    #[inline]
    fn scalar(&self, offset: usize, idx: usize) -> Scalar {
        let (k, local) = self.locate(offset);
        self.arrays[k].scalar(local, idx)
    }

    fn get_string(&self, offset: usize, idx: usize) -> Option<&str> {
        let (k, local) = self.locate(offset);
        self.arrays[k].get_string(local, idx)
    }

    /// Only answered when every sub-array shares one string table.
    fn string_index(&self, offset: usize, idx: usize) -> Option<usize> {
        self.indexed_strings()?;
        let (k, local) = self.locate(offset);
        self.arrays[k].string_index(local, idx)
    }

    fn indexed_strings(&self) -> Option<&Arc<StringTable>> {
        let table = self.arrays[0].indexed_strings()?;
        self.arrays[1..]
            .iter()
            .all(|a| a.indexed_strings().is_some_and(|t| Arc::ptr_eq(t, table)))
            .then_some(table)
    }

    fn fill_array(&self, dest: &mut FillDest<'_>, start: usize, length: usize, tsize: usize) {
        debug_assert!(start + length <= self.entries());
        if length == 0 {
            return;
        }
        let (mut k, mut local) = self.locate(start);
        let mut written = 0;
        while written < length {
            let available = self.arrays[k].entries() - local;
            let n = available.min(length - written);
            if n > 0 {
                self.arrays[k].fill_array(&mut dest.tail(written * tsize), local, n, tsize);
            }
            written += n;
            k += 1;
            local = 0;
        }
    }
}

impl fmt::Debug for ListArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListArray")
            .field("storage", &self.storage)
            .field("entries", &self.entries())
            .field("arrays", &self.arrays.len())
            .finish()
    }
}
