//! Attribute map - name to slot index schema.

use std::collections::HashMap;
use std::fmt;

/// Element class an attribute was originally defined on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Owner {
    /// Per face-vertex
    Vertex,
    /// Per point, shared by the vertices that reference it
    Point,
    /// Per face / curve / primitive
    Primitive,
    /// One value for the whole detail
    Detail,
    #[default]
    Invalid,
}

impl Owner {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Point => "point",
            Self::Primitive => "primitive",
            Self::Detail => "detail",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Ordered attribute names with a hash lookup.
///
/// Indices are ordinal and never move. `remove` only drops the name from the
/// lookup, so the name table may hold the same name twice once it is re-added.
/// Two maps are equal when their name sequences are equal.
#[derive(Clone, Default)]
pub struct AttributeMap {
    names: Vec<String>,
    export_names: Vec<Option<String>>,
    owners: Vec<Owner>,
    lookup: HashMap<String, usize>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map holding `names` in order. Duplicates collapse onto the first slot.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = Self::new();
        for name in names {
            map.add(name.as_ref(), false);
        }
        map
    }

    /// Add `name`.
    ///
    /// A new name gets a new slot and its index. An existing name returns its
    /// index unchanged unless `replace_existing` is set, in which case the
    /// slot's metadata is cleared for reuse and `None` reports that no slot
    /// was created.
    pub fn add(&mut self, name: &str, replace_existing: bool) -> Option<usize> {
        if let Some(&index) = self.lookup.get(name) {
            if !replace_existing {
                return Some(index);
            }
            self.export_names[index] = None;
            self.owners[index] = Owner::Invalid;
            return None;
        }
        Some(self.push_slot(name, None, Owner::Invalid))
    }

    /// Append a slot unconditionally; the lookup points at the new slot.
    pub(crate) fn push_slot(&mut self, name: &str, export: Option<String>, owner: Owner) -> usize {
        let index = self.names.len();
        self.names.push(name.to_string());
        self.export_names.push(export);
        self.owners.push(owner);
        self.lookup.insert(name.to_string(), index);
        index
    }

    /// Slot of `name`.
    #[inline]
    pub fn get(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    /// Make `name` unreachable. Its slot stays, so other indices are stable.
    pub fn remove(&mut self, name: &str) -> bool {
        self.lookup.remove(name).is_some()
    }

    /// True if slot `index` can still be found by name.
    pub fn is_reachable(&self, index: usize) -> bool {
        self.names
            .get(index)
            .is_some_and(|n| self.lookup.get(n) == Some(&index))
    }

    /// Reachable entries of `src` accepted by `keep(name, index)`, in order.
    pub fn filter<F>(src: &AttributeMap, mut keep: F) -> AttributeMap
    where
        F: FnMut(&str, usize) -> bool,
    {
        let mut out = AttributeMap::new();
        for (index, name) in src.names.iter().enumerate() {
            if src.is_reachable(index) && keep(name, index) {
                out.push_slot(name, src.export_names[index].clone(), src.owners[index]);
            }
        }
        out
    }

    /// Number of slots.
    #[inline]
    pub fn entries(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Name to publish the attribute under; defaults to its own name.
    pub fn export_name(&self, index: usize) -> Option<&str> {
        match self.export_names.get(index)? {
            Some(alias) => Some(alias.as_str()),
            None => self.name(index),
        }
    }

    pub fn set_export_name(&mut self, index: usize, alias: impl Into<String>) {
        if let Some(slot) = self.export_names.get_mut(index) {
            *slot = Some(alias.into());
        }
    }

    pub fn original_owner(&self, index: usize) -> Owner {
        self.owners.get(index).copied().unwrap_or_default()
    }

    pub fn set_original_owner(&mut self, index: usize, owner: Owner) {
        if let Some(slot) = self.owners.get_mut(index) {
            *slot = owner;
        }
    }

    /// Raw export alias of a slot, without the name fallback.
    pub(crate) fn export_alias(&self, index: usize) -> Option<String> {
        self.export_names.get(index).cloned().flatten()
    }

    /// Names starting with `__` are bookkeeping, not user data.
    pub fn is_internal(&self, index: usize) -> bool {
        self.name(index).is_some_and(|n| n.starts_with("__"))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().enumerate().map(|(i, n)| (i, n.as_str()))
    }

    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>()
            + self
                .names
                .iter()
                .map(|n| n.capacity() * 2 + std::mem::size_of::<String>() * 2)
                .sum::<usize>()
    }
}

impl PartialEq for AttributeMap {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

impl Eq for AttributeMap {}

impl fmt::Debug for AttributeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names.iter()).finish()
    }
}
