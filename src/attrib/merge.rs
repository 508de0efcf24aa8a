//! Merging two attribute maps with priority to the first.

use std::sync::Arc;

use super::AttributeMap;

/// Which input of a merge an index refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MergeSource {
    First,
    Second,
}

/// Index translation for the union of two maps.
///
/// The merged map is `m1` followed by every reachable name of `m2` not
/// already in `m1`. A name present in both resolves to `m1`'s slot, and `m1`
/// supplies its data.
#[derive(Clone, Debug)]
pub struct AttributeMerge {
    map: Arc<AttributeMap>,
    first: Vec<usize>,
    second: Vec<Option<usize>>,
    sources: Vec<(MergeSource, usize)>,
}

impl AttributeMerge {
    pub fn new(m1: &AttributeMap, m2: &AttributeMap) -> Self {
        let mut map = AttributeMap::new();
        let mut sources = Vec::with_capacity(m1.entries() + m2.entries());

        let first: Vec<usize> = (0..m1.entries())
            .map(|i| {
                let name = m1.name(i).unwrap_or_default();
                let dest = map.push_slot(name, m1.export_alias(i), m1.original_owner(i));
                sources.push((MergeSource::First, i));
                dest
            })
            .collect();

        let second: Vec<Option<usize>> = (0..m2.entries())
            .map(|i| {
                if !m2.is_reachable(i) {
                    return None;
                }
                let name = m2.name(i)?;
                if let Some(shared) = m1.get(name) {
                    return Some(first[shared]);
                }
                let dest = map.push_slot(name, m2.export_alias(i), m2.original_owner(i));
                sources.push((MergeSource::Second, i));
                Some(dest)
            })
            .collect();

        Self {
            map: Arc::new(map),
            first,
            second,
            sources,
        }
    }

    /// The merged map.
    pub fn map(&self) -> &Arc<AttributeMap> {
        &self.map
    }

    /// Slot in the merged map for `source_index` of the given input.
    pub fn dest_index(&self, source_index: usize, source: MergeSource) -> Option<usize> {
        match source {
            MergeSource::First => self.first.get(source_index).copied(),
            MergeSource::Second => self.second.get(source_index).copied().flatten(),
        }
    }

    /// Input and index supplying the data for merged slot `dest`.
    pub fn source(&self, dest: usize) -> Option<(MergeSource, usize)> {
        self.sources.get(dest).copied()
    }

    /// True if entry `index` of `m2` lost to a same-named entry of `m1`.
    pub fn is_superseded(&self, index: usize) -> bool {
        self.dest_index(index, MergeSource::Second)
            .is_some_and(|d| self.sources[d].0 == MergeSource::First)
    }

    /// Merged entry count.
    pub fn entries(&self) -> usize {
        self.map.entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_union() {
        let m1 = AttributeMap::from_names(["a", "b"]);
        let m2 = AttributeMap::from_names(["b", "c"]);
        let merge = AttributeMerge::new(&m1, &m2);
        assert_eq!(merge.map().names(), &["a", "b", "c"]);
        assert_eq!(merge.dest_index(0, MergeSource::Second), Some(1));
        assert_eq!(merge.dest_index(1, MergeSource::Second), Some(2));
        assert_eq!(merge.dest_index(1, MergeSource::First), Some(1));
        assert_eq!(merge.source(1), Some((MergeSource::First, 1)));
        assert_eq!(merge.source(2), Some((MergeSource::Second, 1)));
        assert!(merge.is_superseded(0));
        assert!(!merge.is_superseded(1));
    }

    #[test]
    fn test_out_of_range() {
        let m1 = AttributeMap::from_names(["a"]);
        let merge = AttributeMerge::new(&m1, &AttributeMap::new());
        assert_eq!(merge.dest_index(3, MergeSource::First), None);
        assert_eq!(merge.dest_index(0, MergeSource::Second), None);
        assert_eq!(merge.source(1), None);
    }

    #[test]
    fn test_removed_names_are_skipped() {
        let m1 = AttributeMap::from_names(["P"]);
        let mut m2 = AttributeMap::from_names(["Cd", "uv"]);
        m2.remove("Cd");
        let merge = AttributeMerge::new(&m1, &m2);
        assert_eq!(merge.map().names(), &["P", "uv"]);
        assert_eq!(merge.dest_index(0, MergeSource::Second), None);
        assert_eq!(merge.dest_index(1, MergeSource::Second), Some(1));
    }

    #[test]
    fn test_metadata_carried() {
        let m1 = AttributeMap::from_names(["P"]);
        let mut m2 = AttributeMap::from_names(["Cd"]);
        m2.set_export_name(0, "displayColor");
        m2.set_original_owner(0, super::super::Owner::Primitive);
        let merge = AttributeMerge::new(&m1, &m2);
        assert_eq!(merge.map().export_name(1), Some("displayColor"));
        assert_eq!(merge.map().original_owner(1), super::super::Owner::Primitive);
    }
}
