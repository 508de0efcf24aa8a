//! Gather view: `get(i) == data.get(indices.get(i))`.

use std::fmt;
use std::sync::Arc;

use super::{combine_data_ids, DataArray, DataArrayExt, DataArrayHandle, NumericArray, StringTable};
use crate::util::{Scalar, Storage, TypeInfo};

/// Largest index count for which a gather over another gather is collapsed
/// into a single level at construction.
pub const DEFAULT_UNMAP_THRESHOLD: usize = 4096;

/// Reads `data` through an integer index array.
///
/// Typical use is expanding per-point attributes to per-vertex through a
/// mesh's vertex list.
#[derive(Clone)]
pub struct IndirectArray {
    indices: DataArrayHandle,
    data: DataArrayHandle,
}

impl IndirectArray {
    pub fn new(indices: DataArrayHandle, data: DataArrayHandle) -> Self {
        Self::with_threshold(indices, data, DEFAULT_UNMAP_THRESHOLD)
    }

    /// Build the view, composing nested gathers when `indices` has at most
    /// `threshold` entries. Composition only changes how many hops a read
    /// takes, never the values read.
    pub fn with_threshold(indices: DataArrayHandle, data: DataArrayHandle, threshold: usize) -> Self {
        debug_assert!(indices.storage().is_integer(), "indirect indices must be integers");
        if indices.entries() <= threshold {
            if let Some((inner_indices, inner_data)) = data.indirection() {
                let composed: Vec<i64> = (0..indices.entries())
                    .map(|i| inner_indices.get_i64(indices.get_i64(i, 0) as usize, 0))
                    .collect();
                return Self {
                    indices: Arc::new(NumericArray::new(composed, 1).with_data_id(
                        combine_data_ids(&[indices.data_id(), inner_indices.data_id()], &[]),
                    )),
                    data: Arc::clone(inner_data),
                };
            }
        }
        Self { indices, data }
    }

    pub fn indices(&self) -> &DataArrayHandle {
        &self.indices
    }

    pub fn data(&self) -> &DataArrayHandle {
        &self.data
    }

    #[inline]
    fn map(&self, offset: usize) -> usize {
        let index = self.indices.scalar(offset, 0).as_i64();
        debug_assert!(
            index >= 0 && (index as usize) < self.data.entries(),
            "indirect index {} out of {}",
            index,
            self.data.entries()
        );
        index as usize
    }
}

impl DataArray for IndirectArray {
    fn entries(&self) -> usize {
        self.indices.entries()
    }

    fn tuple_size(&self) -> usize {
        self.data.tuple_size()
    }

    fn storage(&self) -> Storage {
        self.data.storage()
    }

    fn type_info(&self) -> TypeInfo {
        self.data.type_info()
    }

    fn data_id(&self) -> i64 {
        combine_data_ids(&[self.indices.data_id(), self.data.data_id()], &[])
    }

    fn is_valid(&self) -> bool {
        self.indices.is_valid() && self.data.is_valid()
    }

    #[inline]
    fn scalar(&self, offset: usize, idx: usize) -> Scalar {
        self.data.scalar(self.map(offset), idx)
    }

    fn get_string(&self, offset: usize, idx: usize) -> Option<&str> {
        self.data.get_string(self.map(offset), idx)
    }

    fn string_index(&self, offset: usize, idx: usize) -> Option<usize> {
        self.data.string_index(self.map(offset), idx)
    }

    fn indexed_strings(&self) -> Option<&Arc<StringTable>> {
        self.data.indexed_strings()
    }

    fn indirection(&self) -> Option<(&DataArrayHandle, &DataArrayHandle)> {
        Some((&self.indices, &self.data))
    }
}

impl fmt::Debug for IndirectArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndirectArray")
            .field("indices", &self.indices)
            .field("data", &self.data)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::harden;

    fn ints(v: Vec<i32>) -> DataArrayHandle {
        Arc::new(NumericArray::new(v, 1))
    }

    #[test]
    fn test_gather() {
        let view = IndirectArray::new(ints(vec![1, 4, 2, 3]), ints(vec![10, 20, 30, 40, 50]));
        assert_eq!(view.entries(), 4);
        assert_eq!(view.get_i32(1, 0), 50);
        assert_eq!(view.get_i32(3, 0), 40);
    }

    #[test]
    fn test_gather_matches_definition() {
        let indices = ints(vec![1, 4, 2, 3]);
        let data = ints(vec![10, 20, 30, 40, 50]);
        let view = IndirectArray::new(indices.clone(), data.clone());
        for i in 0..view.entries() {
            assert_eq!(view.get_f64(i, 0), data.get_f64(indices.get_i64(i, 0) as usize, 0));
        }
    }

    #[test]
    fn test_nested_gather_composes() {
        let data = ints(vec![10, 20, 30, 40, 50]);
        let inner: DataArrayHandle = Arc::new(IndirectArray::new(ints(vec![4, 3, 2, 1, 0]), data.clone()));
        let outer = IndirectArray::new(ints(vec![0, 0, 4]), inner.clone());
        assert!(Arc::ptr_eq(outer.data(), &data));
        assert_eq!(outer.get_i32(0, 0), 50);
        assert_eq!(outer.get_i32(2, 0), 10);

        let nested = IndirectArray::with_threshold(ints(vec![0, 0, 4]), inner.clone(), 0);
        assert!(Arc::ptr_eq(nested.data(), &inner));
        assert!(nested.is_equal(&outer));
    }

    #[test]
    fn test_harden_breaks_indirection() {
        let view: DataArrayHandle =
            Arc::new(IndirectArray::new(ints(vec![2, 2, 0]), ints(vec![5, 6, 7])));
        let flat = harden(&view);
        assert!(flat.indirection().is_none());
        assert_eq!(flat.fill_all::<i32>(), vec![7, 7, 5]);
    }
}
