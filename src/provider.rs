//! Seam to the geometry detail that owns the authoritative attribute data.

use std::collections::HashMap;
use std::sync::Arc;

use crate::array::{DataArray, DataArrayHandle, IndirectArray, SubArray};
use crate::attrib::{is_valid_attribute_name, AttributeList, AttributeMap, Owner};
use crate::util::{Error, Status};

/// Which elements of the source an extracted array covers.
#[derive(Clone, Debug, Default)]
pub enum IndexMapping {
    /// Every element in source order
    #[default]
    Identity,
    /// Elements `start..start + length`
    Range { start: usize, length: usize },
    /// Elements picked by an index array
    Gather(DataArrayHandle),
}

impl IndexMapping {
    /// View `array` through this mapping.
    pub fn apply(&self, array: DataArrayHandle) -> DataArrayHandle {
        match self {
            Self::Identity => array,
            Self::Range { start, length } => Arc::new(SubArray::new(array, *start, *length)),
            Self::Gather(indices) => Arc::new(IndirectArray::new(Arc::clone(indices), array)),
        }
    }
}

/// Source of attribute arrays keyed by owner class and name.
pub trait GeometryProvider: Send + Sync {
    /// Names available on `owner`, in the provider's order.
    fn attribute_names(&self, owner: Owner) -> Vec<String>;

    /// Array for `name` on `owner` seen through `mapping`.
    fn extract(&self, name: &str, owner: Owner, mapping: &IndexMapping) -> Option<DataArrayHandle>;
}

/// Provider backed by attribute lists held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryProvider {
    lists: HashMap<Owner, AttributeList>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(mut self, owner: Owner, list: AttributeList) -> Self {
        self.lists.insert(owner, list);
        self
    }

    pub fn list(&self, owner: Owner) -> Option<&AttributeList> {
        self.lists.get(&owner)
    }
}

impl GeometryProvider for MemoryProvider {
    fn attribute_names(&self, owner: Owner) -> Vec<String> {
        self.lists
            .get(&owner)
            .map(|l| {
                (0..l.entries())
                    .filter(|&i| l.map().is_reachable(i))
                    .filter_map(|i| l.map().name(i).map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn extract(&self, name: &str, owner: Owner, mapping: &IndexMapping) -> Option<DataArrayHandle> {
        let array = self.lists.get(&owner)?.find(name)?;
        Some(mapping.apply(Arc::clone(array)))
    }
}

impl AttributeList {
    /// Pull `names` (or every name) of `owner` out of a provider.
    ///
    /// Unknown names are reported as warnings and skipped; malformed names
    /// are errors. Returns `None` when nothing could be extracted.
    pub fn from_provider(
        provider: &dyn GeometryProvider,
        owner: Owner,
        names: Option<&[&str]>,
        mapping: &IndexMapping,
        status: &mut Status,
    ) -> Option<AttributeList> {
        let wanted: Vec<String> = match names {
            Some(names) => names.iter().map(|n| n.to_string()).collect(),
            None => provider.attribute_names(owner),
        };

        let mut map = AttributeMap::new();
        let mut arrays = Vec::with_capacity(wanted.len());
        let mut entries: Option<usize> = None;
        for name in &wanted {
            if !is_valid_attribute_name(name) {
                status.record(&Error::InvalidAttributeName(name.clone()));
                continue;
            }
            if map.contains(name) {
                continue;
            }
            let Some(array) = provider.extract(name, owner, mapping) else {
                status.add_warning(format!("no {} attribute '{}'", owner, name));
                continue;
            };
            match entries {
                Some(n) if n != array.entries() => {
                    status.add_warning(format!(
                        "{} attribute '{}' has {} entries, expected {}",
                        owner,
                        name,
                        array.entries(),
                        n
                    ));
                }
                None => entries = Some(array.entries()),
                _ => {}
            }
            map.push_slot(name, None, owner);
            arrays.push(array);
        }

        if arrays.is_empty() {
            tracing::debug!(%owner, "provider yielded no attributes");
            return None;
        }
        let mut list = AttributeList::new(Arc::new(map), 1);
        for (index, array) in arrays.into_iter().enumerate() {
            list.set(index, 0, array);
        }
        Some(list)
    }
}
