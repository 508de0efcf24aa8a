//! Sorted, de-duplicated index set with a lazy one-time sort.

use std::fmt;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use super::{next_data_id, DataArray, DataArrayExt};
use crate::util::{Scalar, Storage, TypeInfo};

/// Element indices gathered in any order, read back sorted and unique.
///
/// Producers push indices unsorted (face-set membership, for instance). The
/// first read sorts and de-duplicates the buffer under a lock; every later
/// read goes straight to the sorted result without locking.
pub struct SelectionArray {
    pending: Mutex<Vec<i64>>,
    sorted: OnceCell<Vec<i64>>,
    data_id: i64,
}

impl SelectionArray {
    pub fn new(indices: Vec<i64>) -> Self {
        Self {
            pending: Mutex::new(indices),
            sorted: OnceCell::new(),
            data_id: next_data_id(),
        }
    }

    /// Collect the first component of an integer array.
    pub fn from_array(array: &dyn DataArray) -> Self {
        Self::new((0..array.entries()).map(|i| array.get_i64(i, 0)).collect())
    }

    /// Add an index before the selection is shared.
    pub fn push(&mut self, index: i64) {
        debug_assert!(self.sorted.get().is_none(), "selection already read");
        self.pending.get_mut().push(index);
    }

    /// Sorted unique indices.
    pub fn indices(&self) -> &[i64] {
        self.sorted.get_or_init(|| {
            let mut indices = std::mem::take(&mut *self.pending.lock());
            indices.sort_unstable();
            indices.dedup();
            tracing::trace!(entries = indices.len(), "selection sorted");
            indices
        })
    }

    pub fn contains(&self, index: i64) -> bool {
        self.indices().binary_search(&index).is_ok()
    }

    /// True once the one-time sort has run.
    pub fn is_sorted(&self) -> bool {
        self.sorted.get().is_some()
    }
}

impl DataArray for SelectionArray {
    fn entries(&self) -> usize {
        self.indices().len()
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
        self.data_id
    }

    fn memory_usage(&self) -> usize {
        let len = match self.sorted.get() {
            Some(v) => v.capacity(),
            None => self.pending.lock().capacity(),
        };
        std::mem::size_of::<Self>() + len * std::mem::size_of::<i64>()
    }

    #[inline]
    fn scalar(&self, offset: usize, _idx: usize) -> Scalar {
        Scalar::Int(self.indices()[offset])
    }

    fn is_hardened(&self) -> bool {
        true
    }
}

impl fmt::Debug for SelectionArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionArray")
            .field("sorted", &self.is_sorted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_sorted_unique() {
        let mut s = SelectionArray::new(vec![5, 1, 3, 1]);
        s.push(0);
        assert!(!s.is_sorted());
        assert_eq!(s.entries(), 4);
        assert!(s.is_sorted());
        assert_eq!(s.fill_all::<i64>(), vec![0, 1, 3, 5]);
        assert!(s.contains(3));
        assert!(!s.contains(2));
    }

    #[test]
    fn test_concurrent_first_read() {
        let s = Arc::new(SelectionArray::new((0..1000).rev().chain(0..1000).collect()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let s = Arc::clone(&s);
                std::thread::spawn(move || (s.entries(), s.get_i64(999, 0)))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), (1000, 999));
        }
    }
}
