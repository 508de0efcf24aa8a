//! Constant arrays: one tuple repeated over a virtual length.

use std::fmt;
use std::sync::Arc;

use super::{combine_data_ids, DataArray, DataArrayHandle, StringTable};
use crate::util::{Numeric, Scalar, Storage, TypeInfo};

/// Owned constant: a single tuple answered for every offset.
#[derive(Clone)]
pub struct ConstantValueArray<T: Numeric> {
    value: Vec<T>,
    entries: usize,
    type_info: TypeInfo,
    data_id: i64,
}

impl<T: Numeric> ConstantValueArray<T> {
    pub fn new(entries: usize, value: &[T]) -> Self {
        debug_assert!(!value.is_empty());
        Self {
            value: value.to_vec(),
            entries,
            type_info: TypeInfo::None,
            data_id: -1,
        }
    }

    /// Scalar constant.
    pub fn scalar_value(entries: usize, value: T) -> Self {
        Self::new(entries, &[value])
    }

    pub fn with_type_info(mut self, type_info: TypeInfo) -> Self {
        self.type_info = type_info;
        self
    }

    pub fn with_data_id(mut self, data_id: i64) -> Self {
        self.data_id = data_id;
        self
    }

    pub fn value(&self) -> &[T] {
        &self.value
    }
}

impl<T: Numeric> DataArray for ConstantValueArray<T> {
    fn entries(&self) -> usize {
        self.entries
    }

    fn tuple_size(&self) -> usize {
        self.value.len()
    }

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
        std::mem::size_of::<Self>() + self.value.capacity() * std::mem::size_of::<T>()
    }

    #[inline]
    fn scalar(&self, _offset: usize, idx: usize) -> Scalar {
        self.value[idx].to_scalar()
    }

    fn is_hardened(&self) -> bool {
        true
    }

    fn materialize(&self) -> DataArrayHandle {
        Arc::new(self.clone())
    }
}

impl<T: Numeric> fmt::Debug for ConstantValueArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstantValueArray")
            .field("value", &self.value)
            .field("entries", &self.entries)
            .finish()
    }
}

/// Broadcast view: every offset reads tuple `source_offset` of another array.
///
/// Stretches one value of an existing array over `entries` elements without
/// copying it.
#[derive(Clone)]
pub struct ConstantArray {
    array: DataArrayHandle,
    source_offset: usize,
    entries: usize,
}

impl ConstantArray {
    pub fn new(array: DataArrayHandle, source_offset: usize, entries: usize) -> Self {
        debug_assert!(
            array.entries() > source_offset,
            "constant source offset {} out of {}",
            source_offset,
            array.entries()
        );
        Self {
            array,
            source_offset,
            entries,
        }
    }

    pub fn source(&self) -> &DataArrayHandle {
        &self.array
    }

    pub fn source_offset(&self) -> usize {
        self.source_offset
    }
}

impl DataArray for ConstantArray {
    fn entries(&self) -> usize {
        self.entries
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
        combine_data_ids(
            &[self.array.data_id()],
            &[self.source_offset as u64, self.entries as u64],
        )
    }

    fn is_valid(&self) -> bool {
        self.array.is_valid()
    }

    #[inline]
    fn scalar(&self, _offset: usize, idx: usize) -> Scalar {
        self.array.scalar(self.source_offset, idx)
    }

    fn get_string(&self, _offset: usize, idx: usize) -> Option<&str> {
        self.array.get_string(self.source_offset, idx)
    }

    fn string_index(&self, _offset: usize, idx: usize) -> Option<usize> {
        self.array.string_index(self.source_offset, idx)
    }

    fn indexed_strings(&self) -> Option<&Arc<StringTable>> {
        self.array.indexed_strings()
    }
}

impl fmt::Debug for ConstantArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstantArray")
            .field("source_offset", &self.source_offset)
            .field("entries", &self.entries)
            .field("array", &self.array)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::{harden, DataArrayExt, IndexedStringArray, NumericArray};

    #[test]
    fn test_constant_value() {
        let c = ConstantValueArray::new(5, &[0.5f32, 1.0, 0.0]);
        assert_eq!(c.entries(), 5);
        assert_eq!(c.tuple_size(), 3);
        for i in 0..5 {
            assert_eq!(c.get_f32(i, 1), 1.0);
        }
        assert!(c.is_hardened());
    }

    #[test]
    fn test_broadcast_all_offsets_equal() {
        let src: DataArrayHandle = Arc::new(NumericArray::new(vec![10i32, 20, 30], 1));
        let view = ConstantArray::new(src, 2, 100);
        assert_eq!(view.entries(), 100);
        for i in 0..100 {
            assert_eq!(view.get_i32(i, 0), view.get_i32(0, 0));
        }
        assert_eq!(view.get_i64(57, 0), 30);
    }

    #[test]
    fn test_broadcast_strings() {
        let src: DataArrayHandle = Arc::new(IndexedStringArray::from_strings(["a", "b"], 1));
        let view: DataArrayHandle = Arc::new(ConstantArray::new(src, 1, 3));
        assert_eq!(view.get_string(2, 0), Some("b"));
        let flat = harden(&view);
        assert_eq!(flat.entries(), 3);
        assert_eq!(flat.get_string(0, 0), Some("b"));
    }

    #[test]
    fn test_broadcast_data_id() {
        let src: DataArrayHandle = Arc::new(NumericArray::new(vec![1u8, 2], 1).with_data_id(7));
        let a = ConstantArray::new(src.clone(), 0, 4);
        let b = ConstantArray::new(src, 1, 4);
        assert!(a.data_id() >= 0);
        assert_ne!(a.data_id(), b.data_id());
    }
}
