//! Indexed strings: integer codes into a shared string table.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{DataArray, DataArrayHandle};
use crate::util::{Scalar, Storage, TypeInfo};

/// Immutable, shareable table of unique strings.
///
/// Built once through a [`StringTableBuilder`] and then handed to any number
/// of arrays, which keeps each distinct string stored exactly once.
#[derive(Default)]
pub struct StringTable {
    strings: Vec<Arc<str>>,
    lookup: HashMap<Arc<str>, usize>,
}

impl StringTable {
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(|s| &**s)
    }

    /// Index of `s`, if present.
    pub fn find(&self, s: &str) -> Option<usize> {
        self.lookup.get(s).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(|s| &**s)
    }

    /// Start a new table containing every string of this one, same indices.
    pub fn to_builder(&self) -> StringTableBuilder {
        StringTableBuilder {
            strings: self.strings.clone(),
            lookup: self.lookup.clone(),
        }
    }

    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.strings.iter().map(|s| s.len() + std::mem::size_of::<Arc<str>>() * 2).sum::<usize>()
    }
}

impl fmt::Debug for StringTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.strings.iter()).finish()
    }
}

/// Mutable side of a [`StringTable`].
#[derive(Default)]
pub struct StringTableBuilder {
    strings: Vec<Arc<str>>,
    lookup: HashMap<Arc<str>, usize>,
}

impl StringTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `s`, adding it if it is new.
    pub fn intern(&mut self, s: &str) -> usize {
        if let Some(&index) = self.lookup.get(s) {
            return index;
        }
        let index = self.strings.len();
        let shared: Arc<str> = Arc::from(s);
        self.strings.push(Arc::clone(&shared));
        self.lookup.insert(shared, index);
        index
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn build(self) -> Arc<StringTable> {
        Arc::new(StringTable {
            strings: self.strings,
            lookup: self.lookup,
        })
    }
}

/// String array storing one `i32` code per component.
///
/// A negative code is an unset string and reads as `None`.
#[derive(Clone)]
pub struct IndexedStringArray {
    table: Arc<StringTable>,
    codes: Vec<i32>,
    tuple_size: usize,
    type_info: TypeInfo,
    data_id: i64,
}

impl IndexedStringArray {
    pub fn new(table: Arc<StringTable>, codes: Vec<i32>, tuple_size: usize) -> Self {
        debug_assert!(tuple_size > 0);
        debug_assert_eq!(codes.len() % tuple_size.max(1), 0);
        debug_assert!(codes.iter().all(|&c| c < table.len() as i32));
        Self {
            table,
            codes,
            tuple_size,
            type_info: TypeInfo::None,
            data_id: -1,
        }
    }

    /// Build a private table from a sequence of strings, tuple-major.
    pub fn from_strings<I, S>(strings: I, tuple_size: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = StringTableBuilder::new();
        let codes = strings
            .into_iter()
            .map(|s| builder.intern(s.as_ref()) as i32)
            .collect();
        Self::new(builder.build(), codes, tuple_size)
    }

    pub fn with_type_info(mut self, type_info: TypeInfo) -> Self {
        self.type_info = type_info;
        self
    }

    pub fn with_data_id(mut self, data_id: i64) -> Self {
        self.data_id = data_id;
        self
    }

    pub fn table(&self) -> &Arc<StringTable> {
        &self.table
    }

    pub fn codes(&self) -> &[i32] {
        &self.codes
    }

    #[inline]
    fn code(&self, offset: usize, idx: usize) -> i32 {
        self.codes[offset * self.tuple_size + idx]
    }
}

impl DataArray for IndexedStringArray {
    fn entries(&self) -> usize {
        if self.tuple_size == 0 {
            0
        } else {
            self.codes.len() / self.tuple_size
        }
    }

    fn tuple_size(&self) -> usize {
        self.tuple_size
    }

    fn storage(&self) -> Storage {
        Storage::String
    }

    fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    fn data_id(&self) -> i64 {
        self.data_id
    }

    fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + self.codes.capacity() * std::mem::size_of::<i32>()
    }

    #[inline]
    fn scalar(&self, offset: usize, idx: usize) -> Scalar {
        Scalar::Int(self.code(offset, idx) as i64)
    }

    fn get_string(&self, offset: usize, idx: usize) -> Option<&str> {
        let code = self.code(offset, idx);
        if code < 0 {
            None
        } else {
            self.table.get(code as usize)
        }
    }

    fn string_index(&self, offset: usize, idx: usize) -> Option<usize> {
        let code = self.code(offset, idx);
        (code >= 0).then_some(code as usize)
    }

    fn indexed_strings(&self) -> Option<&Arc<StringTable>> {
        Some(&self.table)
    }

    fn is_hardened(&self) -> bool {
        true
    }

    fn materialize(&self) -> DataArrayHandle {
        Arc::new(self.clone())
    }
}

impl fmt::Debug for IndexedStringArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedStringArray")
            .field("entries", &self.entries())
            .field("tuple_size", &self.tuple_size)
            .field("strings", &self.table.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::DataArrayExt;

    #[test]
    fn test_intern_dedups() {
        let mut builder = StringTableBuilder::new();
        assert_eq!(builder.intern("red"), 0);
        assert_eq!(builder.intern("green"), 1);
        assert_eq!(builder.intern("red"), 0);
        let table = builder.build();
        assert_eq!(table.len(), 2);
        assert_eq!(table.find("green"), Some(1));
        assert_eq!(table.find("blue"), None);
    }

    #[test]
    fn test_shared_table() {
        let mut builder = StringTableBuilder::new();
        let a = builder.intern("/obj/a") as i32;
        let b = builder.intern("/obj/b") as i32;
        let table = builder.build();

        let first = IndexedStringArray::new(Arc::clone(&table), vec![a, b, a], 1);
        let second = IndexedStringArray::new(Arc::clone(&table), vec![b, -1], 1);
        assert!(Arc::ptr_eq(first.table(), second.table()));
        assert_eq!(first.get_string(2, 0), Some("/obj/a"));
        assert_eq!(second.get_string(0, 0), Some("/obj/b"));
        assert_eq!(second.get_string(1, 0), None);
        assert_eq!(second.string_index(1, 0), None);
        assert_eq!(first.string_index(1, 0), Some(1));
        assert_eq!(first.get_i32(1, 0), 1);
    }

    #[test]
    fn test_from_strings() {
        let a = IndexedStringArray::from_strings(["x", "y", "x", "z"], 2);
        assert_eq!(a.entries(), 2);
        assert_eq!(a.table().len(), 3);
        assert_eq!(a.to_strings(), vec![
            Some("x".to_string()),
            Some("y".to_string()),
            Some("x".to_string()),
            Some("z".to_string()),
        ]);
    }

    #[test]
    fn test_extend_table() {
        let table = IndexedStringArray::from_strings(["a"], 1).table().clone();
        let mut builder = table.to_builder();
        assert_eq!(builder.intern("a"), 0);
        assert_eq!(builder.intern("b"), 1);
        assert_eq!(builder.build().len(), 2);
        assert_eq!(table.len(), 1);
    }
}
