//! Attribute list - data arrays per attribute and motion segment.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use super::{AttributeMap, AttributeMerge, MergeSource};
use crate::array::{
    harden, hash_combine, ConstantArray, DataArray, DataArrayExt, DataArrayHandle, IndirectArray,
    ListArray, SubArray,
};

pub type AttributeListHandle = Arc<AttributeList>;

/// Arrays for one slot, one per motion segment.
type Segments = SmallVec<[Option<DataArrayHandle>; 1]>;

/// `map.entries() x segments` array handles sharing one [`AttributeMap`].
///
/// A list with a single segment serves every segment when combined with a
/// motion-blurred list. Arrays in different slots may differ in length.
#[derive(Clone, Debug)]
pub struct AttributeList {
    map: Arc<AttributeMap>,
    segments: usize,
    data: Vec<Segments>,
}

/// Serializable summary of one attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    pub name: String,
    pub export_name: String,
    pub owner: String,
    pub storage: String,
    pub tuple_size: usize,
    pub entries: usize,
    pub type_info: String,
}

/// Flattened attribute values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValues {
    Numeric(Vec<f64>),
    Strings(Vec<Option<String>>),
}

/// Segment count of two combined lists; single-segment lists broadcast.
fn joint_segments(a: usize, b: usize) -> Option<usize> {
    if a == b || b == 1 {
        Some(a)
    } else if a == 1 {
        Some(b)
    } else {
        None
    }
}

impl AttributeList {
    /// Empty slots for every entry of `map`.
    pub fn new(map: Arc<AttributeMap>, segments: usize) -> Self {
        let segments = segments.max(1);
        let data = (0..map.entries()).map(|_| smallvec![None; segments]).collect();
        Self {
            map,
            segments,
            data,
        }
    }

    /// List with no attributes.
    pub fn empty() -> Self {
        Self::new(Arc::new(AttributeMap::new()), 1)
    }

    /// Single-segment list from `(name, array)` pairs. A repeated name keeps
    /// the last array.
    pub fn from_arrays<I, S>(arrays: I) -> Self
    where
        I: IntoIterator<Item = (S, DataArrayHandle)>,
        S: AsRef<str>,
    {
        let mut map = AttributeMap::new();
        let mut data: Vec<Segments> = Vec::new();
        for (name, array) in arrays {
            if let Some(index) = map.add(name.as_ref(), false) {
                if index == data.len() {
                    data.push(smallvec![Some(array)]);
                } else {
                    data[index][0] = Some(array);
                }
            }
        }
        Self {
            map: Arc::new(map),
            segments: 1,
            data,
        }
    }

    pub fn map(&self) -> &Arc<AttributeMap> {
        &self.map
    }

    /// Number of attribute slots; always equals `map().entries()`.
    #[inline]
    pub fn entries(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Motion segments.
    pub fn segments(&self) -> usize {
        self.segments
    }

    pub fn get(&self, index: usize, segment: usize) -> Option<&DataArrayHandle> {
        self.data.get(index)?.get(segment)?.as_ref()
    }

    pub fn get_by_name(&self, name: &str, segment: usize) -> Option<&DataArrayHandle> {
        self.get(self.map.get(name)?, segment)
    }

    /// First-segment array of `name`.
    pub fn find(&self, name: &str) -> Option<&DataArrayHandle> {
        self.get_by_name(name, 0)
    }

    /// Store `array` in one slot of one segment. Out-of-range slots are ignored.
    pub fn set(&mut self, index: usize, segment: usize, array: DataArrayHandle) {
        debug_assert!(index < self.entries() && segment < self.segments);
        if let Some(slot) = self.data.get_mut(index).and_then(|s| s.get_mut(segment)) {
            *slot = Some(array);
        }
    }

    /// Entry count of the first populated array.
    pub fn array_entries(&self) -> Option<usize> {
        self.data.iter().flatten().flatten().map(|a| a.entries()).next()
    }

    /// `(index, name, first-segment array)` for every slot.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, Option<&DataArrayHandle>)> {
        self.map
            .iter()
            .map(move |(i, name)| (i, name, self.get(i, 0)))
    }

    /// Segment-broadcasting read.
    fn array_for(&self, index: usize, segment: usize) -> Option<&DataArrayHandle> {
        let segment = if self.segments == 1 { 0 } else { segment };
        self.get(index, segment)
    }

    fn map_arrays<F>(&self, mut f: F) -> AttributeList
    where
        F: FnMut(&DataArrayHandle) -> DataArrayHandle,
    {
        let data = self
            .data
            .iter()
            .map(|slot| slot.iter().map(|a| a.as_ref().map(&mut f)).collect())
            .collect();
        AttributeList {
            map: Arc::clone(&self.map),
            segments: self.segments,
            data,
        }
    }

    /// Every array viewed over `start..start + length`.
    pub fn create_sub_array(&self, start: usize, length: usize) -> AttributeList {
        self.map_arrays(|a| Arc::new(SubArray::new(Arc::clone(a), start, length)))
    }

    /// Every array broadcasting its element `offset` over `length` entries.
    pub fn create_constant(&self, offset: usize, length: usize) -> AttributeList {
        self.map_arrays(|a| Arc::new(ConstantArray::new(Arc::clone(a), offset, length)))
    }

    /// Every array gathered through `indices`.
    pub fn create_indirect(&self, indices: &DataArrayHandle) -> AttributeList {
        self.map_arrays(|a| Arc::new(IndirectArray::new(Arc::clone(indices), Arc::clone(a))))
    }

    /// Every array materialized.
    pub fn harden_all_arrays(&self) -> AttributeList {
        self.map_arrays(harden)
    }

    /// Concatenate the present lists slot by slot.
    ///
    /// Fails when the lists disagree on names, order or motion segments, or
    /// when a slot cannot be concatenated.
    pub fn concatenate_lists(lists: &[Option<AttributeListHandle>]) -> Option<AttributeList> {
        let present: Vec<&AttributeList> = lists.iter().flatten().map(|l| l.as_ref()).collect();
        let first = *present.first()?;
        if present.len() == 1 {
            return Some(first.clone());
        }
        for list in &present[1..] {
            if list.map != first.map || list.segments != first.segments {
                tracing::debug!(
                    expected = ?first.map,
                    found = ?list.map,
                    "attribute lists do not match, not concatenating"
                );
                return None;
            }
        }

        let mut out = AttributeList::new(Arc::clone(&first.map), first.segments);
        for index in 0..first.entries() {
            for segment in 0..first.segments {
                let arrays: Option<Vec<DataArrayHandle>> = present
                    .iter()
                    .map(|l| l.get(index, segment).cloned())
                    .collect();
                let Some(arrays) = arrays else {
                    tracing::debug!(index, segment, "empty attribute slot, not concatenating");
                    return None;
                };
                match ListArray::new(arrays) {
                    Ok(list) => out.data[index][segment] = Some(Arc::new(list)),
                    Err(err) => {
                        tracing::debug!(name = ?first.map.name(index), %err, "cannot concatenate");
                        return None;
                    }
                }
            }
        }
        Some(out)
    }

    /// Order-dependent hash of every data id, or `None` when any array has
    /// a negative id or a slot is empty.
    pub fn data_id_hash(&self, seed: u64) -> Option<u64> {
        let mut hash = seed;
        for slot in &self.data {
            for array in slot {
                let id = array.as_ref()?.data_id();
                if id < 0 {
                    return None;
                }
                hash = hash_combine(hash, id as u64);
            }
        }
        Some(hash)
    }

    /// Union of two lists. On a name clash `self` wins.
    ///
    /// Lists whose motion segments cannot be reconciled leave `self` as is.
    pub fn merge(&self, other: &AttributeList) -> AttributeList {
        if other.is_empty() {
            return self.clone();
        }
        let Some(segments) = joint_segments(self.segments, other.segments) else {
            tracing::debug!(
                first = self.segments,
                second = other.segments,
                "motion segments differ, merge skipped"
            );
            return self.clone();
        };
        let merge = AttributeMerge::new(&self.map, &other.map);
        let mut out = AttributeList::new(Arc::clone(merge.map()), segments);
        for dest in 0..merge.entries() {
            let Some((source, index)) = merge.source(dest) else {
                continue;
            };
            let list = match source {
                MergeSource::First => self,
                MergeSource::Second => other,
            };
            for segment in 0..segments {
                out.data[dest][segment] = list.array_for(index, segment).cloned();
            }
        }
        out
    }

    /// Merge `constants` broadcast to `length` entries, with `self` taking
    /// priority.
    pub fn merge_expand_constant(&self, constants: &AttributeList, length: usize) -> AttributeList {
        self.merge(&constants.create_constant(0, length))
    }

    /// Element `offset` of `varying` as one-entry constants, merged over `self`.
    ///
    /// Used when splitting a primitive into per-element pieces: the element's
    /// own value wins over the shared one.
    pub fn merge_constant_from(&self, varying: &AttributeList, offset: usize) -> AttributeList {
        varying.create_constant(offset, 1).merge(self)
    }

    /// A copy with `name` bound to `array` in every segment.
    ///
    /// An existing name is kept unless `replace` is set.
    pub fn add_attribute(&self, name: &str, array: DataArrayHandle, replace: bool) -> AttributeList {
        if let Some(index) = self.map.get(name) {
            if !replace {
                return self.clone();
            }
            let mut out = self.clone();
            out.data[index] = smallvec![Some(array); self.segments];
            return out;
        }
        let mut map = (*self.map).clone();
        map.add(name, false);
        let mut data = self.data.clone();
        data.push(smallvec![Some(array); self.segments]);
        AttributeList {
            map: Arc::new(map),
            segments: self.segments,
            data,
        }
    }

    /// A copy without `name`. The remaining slots keep their relative order.
    pub fn remove_attribute(&self, name: &str) -> AttributeList {
        if !self.map.contains(name) {
            return self.clone();
        }
        let mut kept = Vec::with_capacity(self.entries());
        let map = AttributeMap::filter(&self.map, |n, i| {
            let keep = n != name;
            if keep {
                kept.push(i);
            }
            keep
        });
        AttributeList {
            map: Arc::new(map),
            segments: self.segments,
            data: kept.into_iter().map(|i| self.data[i].clone()).collect(),
        }
    }

    /// Descriptor of every populated first-segment slot.
    pub fn describe(&self) -> Vec<AttributeDescriptor> {
        self.iter()
            .filter_map(|(i, name, array)| {
                let array = array?;
                Some(AttributeDescriptor {
                    name: name.to_string(),
                    export_name: self.map.export_name(i).unwrap_or(name).to_string(),
                    owner: self.map.original_owner(i).name().to_string(),
                    storage: array.storage().name().to_string(),
                    tuple_size: array.tuple_size(),
                    entries: array.entries(),
                    type_info: array.type_info().name().to_string(),
                })
            })
            .collect()
    }

    /// Flattened values of one slot.
    pub fn values(&self, index: usize, segment: usize) -> Option<AttributeValues> {
        let array = self.get(index, segment)?;
        Some(if array.storage().is_string() {
            AttributeValues::Strings(array.to_strings())
        } else {
            AttributeValues::Numeric(array.to_f64_vec())
        })
    }

    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>()
            + self
                .data
                .iter()
                .flatten()
                .flatten()
                .map(|a| a.memory_usage())
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::{IndexedStringArray, NumericArray, RangeArray};
    use crate::util::Storage;

    fn ints(v: Vec<i32>) -> DataArrayHandle {
        Arc::new(NumericArray::new(v, 1))
    }

    fn sample() -> AttributeList {
        AttributeList::from_arrays([
            ("P", Arc::new(NumericArray::new(vec![0.0f32; 12], 3)) as DataArrayHandle),
            ("id", ints(vec![10, 11, 12, 13])),
        ])
    }

    #[test]
    fn test_entries_match_map() {
        let list = sample();
        assert_eq!(list.entries(), list.map().entries());
        assert_eq!(list.segments(), 1);
        assert_eq!(list.array_entries(), Some(4));
        assert!(list.find("id").is_some());
        assert!(list.find("missing").is_none());
    }

    #[test]
    fn test_views_share_map() {
        let list = sample();
        let sub = list.create_sub_array(1, 2);
        assert!(Arc::ptr_eq(sub.map(), list.map()));
        assert_eq!(sub.find("id").unwrap().fill_all::<i32>(), vec![11, 12]);

        let constant = list.create_constant(3, 5);
        assert_eq!(constant.find("id").unwrap().fill_all::<i32>(), vec![13; 5]);

        let gather = list.create_indirect(&ints(vec![3, 0]));
        assert_eq!(gather.find("id").unwrap().fill_all::<i32>(), vec![13, 10]);
    }

    #[test]
    fn test_concatenate() {
        let a = Arc::new(AttributeList::from_arrays([("id", ints(vec![1, 2]))]));
        let b = Arc::new(AttributeList::from_arrays([("id", ints(vec![3]))]));
        let joined = AttributeList::concatenate_lists(&[Some(a.clone()), None, Some(b)]).unwrap();
        assert_eq!(joined.find("id").unwrap().fill_all::<i32>(), vec![1, 2, 3]);

        let c = Arc::new(AttributeList::from_arrays([("other", ints(vec![3]))]));
        assert!(AttributeList::concatenate_lists(&[Some(a), Some(c)]).is_none());
        assert!(AttributeList::concatenate_lists(&[None, None]).is_none());
    }

    #[test]
    fn test_data_id_hash() {
        let list = AttributeList::from_arrays([
            ("a", Arc::new(NumericArray::new(vec![1i32], 1).with_data_id(7)) as DataArrayHandle),
            ("b", Arc::new(NumericArray::new(vec![1i32], 1).with_data_id(9)) as DataArrayHandle),
        ]);
        let h = list.data_id_hash(0);
        assert!(h.is_some());
        assert_eq!(h, list.data_id_hash(0));
        assert_ne!(h, list.data_id_hash(1));

        let dirty = list.add_attribute(
            "c",
            Arc::new(NumericArray::new(vec![1i32], 1).with_data_id(-1)),
            false,
        );
        assert_eq!(dirty.data_id_hash(0), None);
        let empty = AttributeList::new(Arc::new(AttributeMap::from_names(["x"])), 1);
        assert_eq!(empty.data_id_hash(0), None);
    }

    #[test]
    fn test_merge_priority() {
        let a = AttributeList::from_arrays([("a", ints(vec![1])), ("b", ints(vec![2]))]);
        let b = AttributeList::from_arrays([("b", ints(vec![20])), ("c", ints(vec![30]))]);
        let merged = a.merge(&b);
        assert_eq!(merged.map().names(), &["a", "b", "c"]);
        assert_eq!(merged.find("b").unwrap().get_i32(0, 0), 2);
        assert_eq!(merged.find("c").unwrap().get_i32(0, 0), 30);
    }

    #[test]
    fn test_merge_segments() {
        let map = Arc::new(AttributeMap::from_names(["P"]));
        let mut moving = AttributeList::new(map, 2);
        moving.set(0, 0, ints(vec![0]));
        moving.set(0, 1, ints(vec![1]));
        let still = AttributeList::from_arrays([("Cd", ints(vec![5]))]);
        let merged = moving.merge(&still);
        assert_eq!(merged.segments(), 2);
        assert_eq!(merged.get_by_name("Cd", 1).unwrap().get_i32(0, 0), 5);

        let mut three = AttributeList::new(Arc::new(AttributeMap::from_names(["N"])), 3);
        three.set(0, 0, ints(vec![0]));
        assert_eq!(moving.merge(&three).map().names(), &["P"]);
    }

    #[test]
    fn test_merge_constants() {
        let points = sample();
        let detail = AttributeList::from_arrays([("Cd", ints(vec![7]))]);
        let expanded = points.merge_expand_constant(&detail, 4);
        assert_eq!(expanded.find("Cd").unwrap().fill_all::<i32>(), vec![7; 4]);

        let per_element = detail.merge_constant_from(&points, 2);
        assert_eq!(per_element.find("id").unwrap().fill_all::<i32>(), vec![12]);
        assert_eq!(per_element.find("Cd").unwrap().get_i32(0, 0), 7);
    }

    #[test]
    fn test_add_remove_attribute() {
        let list = sample();
        let added = list.add_attribute("id", ints(vec![0]), false);
        assert_eq!(added.find("id").unwrap().entries(), 4);
        let replaced = list.add_attribute("id", ints(vec![0]), true);
        assert_eq!(replaced.find("id").unwrap().entries(), 1);
        assert_eq!(replaced.entries(), 2);

        let removed = list.remove_attribute("P");
        assert_eq!(removed.map().names(), &["id"]);
        assert_eq!(removed.find("id").unwrap().get_i32(1, 0), 11);
    }

    #[test]
    fn test_describe_and_values() {
        let list = AttributeList::from_arrays([
            ("name", Arc::new(IndexedStringArray::from_strings(["a", "b"], 1)) as DataArrayHandle),
            ("idx", Arc::new(RangeArray::new(0, 2)) as DataArrayHandle),
        ]);
        let desc = list.describe();
        assert_eq!(desc[0].storage, Storage::String.name());
        assert_eq!(desc[1].type_info, "index");
        assert_eq!(
            list.values(0, 0),
            Some(AttributeValues::Strings(vec![Some("a".into()), Some("b".into())]))
        );
        assert_eq!(list.values(1, 0), Some(AttributeValues::Numeric(vec![0.0, 1.0])));
        let json = serde_json::to_string(&desc).unwrap();
        assert!(json.contains("\"name\":\"name\""));
    }

    #[test]
    fn test_harden_all() {
        let list = sample().create_sub_array(1, 3).harden_all_arrays();
        assert!(list.iter().all(|(_, _, a)| a.unwrap().is_hardened()));
        assert_eq!(list.find("id").unwrap().fill_all::<i32>(), vec![11, 12, 13]);
    }
}
