//! Attribute declarations parsed from text.
//!
//! A declaration pairs a name with a type spec of the form
//! `storage[tuple_size]:type_info`, for example `fpreal32[3]:point`,
//! `int32`, `string` or `fpreal32:color`. The tuple size defaults to what the
//! type info expects, or 1.

use std::str::FromStr;
use std::sync::Arc;

use super::{AttributeList, AttributeMap, Owner};
use crate::array::{dispatch_numeric, DataArrayHandle, IndexedStringArray, NumericArray, StringTableBuilder};
use crate::util::{Error, Result, Status, Storage, TypeInfo};

/// Parsed `storage[tuple_size]:type_info`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeSpec {
    pub storage: Storage,
    pub tuple_size: usize,
    pub type_info: TypeInfo,
}

impl TypeSpec {
    pub fn new(storage: Storage, tuple_size: usize, type_info: TypeInfo) -> Self {
        Self {
            storage,
            tuple_size,
            type_info,
        }
    }

    /// Zero-filled (or unset, for strings) array of `entries` tuples.
    pub fn zeroed(&self, entries: usize) -> DataArrayHandle {
        if self.storage.is_string() {
            let table = StringTableBuilder::new().build();
            return Arc::new(
                IndexedStringArray::new(table, vec![-1; entries * self.tuple_size], self.tuple_size)
                    .with_type_info(self.type_info),
            );
        }
        let tuple_size = self.tuple_size;
        let type_info = self.type_info;
        dispatch_numeric!(self.storage, T => {
            let array: DataArrayHandle =
                Arc::new(NumericArray::<T>::zeroed(entries, tuple_size).with_type_info(type_info));
            array
        }, _ => {
            let array: DataArrayHandle = Arc::new(NumericArray::<u8>::zeroed(entries, tuple_size));
            array
        })
    }
}

impl FromStr for TypeSpec {
    type Err = Error;

    fn from_str(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        let (head, info) = match spec.split_once(':') {
            Some((head, info)) => (head, Some(info)),
            None => (spec, None),
        };

        let type_info = match info {
            Some(name) => TypeInfo::from_name(name.trim())
                .ok_or_else(|| Error::type_spec(spec, format!("unknown type info '{}'", name)))?,
            None => TypeInfo::None,
        };

        let (storage_name, tuple_size) = match head.split_once('[') {
            Some((name, rest)) => {
                let digits = rest
                    .strip_suffix(']')
                    .ok_or_else(|| Error::type_spec(spec, "missing ']'"))?;
                let n: usize = digits
                    .trim()
                    .parse()
                    .map_err(|_| Error::type_spec(spec, format!("bad tuple size '{}'", digits)))?;
                if n == 0 {
                    return Err(Error::type_spec(spec, "tuple size must be positive"));
                }
                (name, Some(n))
            }
            None => (head, None),
        };

        let storage = Storage::from_name(storage_name.trim());
        if !storage.is_valid() {
            return Err(Error::type_spec(spec, format!("unknown storage '{}'", storage_name)));
        }

        let tuple_size = tuple_size
            .or(type_info.expected_tuple_size())
            .unwrap_or(1);
        Ok(Self::new(storage, tuple_size, type_info))
    }
}

/// True for `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Collects attribute declarations and builds a zero-filled list.
///
/// Problems are accumulated into a [`Status`] so that every bad declaration
/// of a batch is reported; `build` refuses to produce a list once an error
/// has been recorded.
#[derive(Clone, Debug)]
pub struct AttributeBuilder {
    entries: usize,
    segments: usize,
    owner: Owner,
    decls: Vec<(String, TypeSpec)>,
}

impl AttributeBuilder {
    pub fn new(entries: usize) -> Self {
        Self {
            entries,
            segments: 1,
            owner: Owner::Invalid,
            decls: Vec::new(),
        }
    }

    pub fn segments(mut self, segments: usize) -> Self {
        self.segments = segments.max(1);
        self
    }

    /// Element class recorded as the original owner of every attribute.
    pub fn owner(mut self, owner: Owner) -> Self {
        self.owner = owner;
        self
    }

    /// Parse and add `name` with a textual type spec.
    pub fn declare(&mut self, name: &str, spec: &str, status: &mut Status) -> &mut Self {
        match spec.parse::<TypeSpec>() {
            Ok(parsed) => self.declare_spec(name, parsed, status),
            Err(err) => {
                status.record(&err);
                self
            }
        }
    }

    /// Add `name` with an already parsed spec.
    pub fn declare_spec(&mut self, name: &str, spec: TypeSpec, status: &mut Status) -> &mut Self {
        if !is_valid_attribute_name(name) {
            status.record(&Error::InvalidAttributeName(name.to_string()));
            return self;
        }
        if self.decls.iter().any(|(n, _)| n == name) {
            status.add_warning(format!("duplicate attribute '{}' ignored", name));
            return self;
        }
        if let Some(expected) = spec.type_info.expected_tuple_size() {
            if expected != spec.tuple_size {
                status.add_warning(format!(
                    "'{}' is {} with {} components, expected {}",
                    name, spec.type_info, spec.tuple_size, expected
                ));
            }
        }
        self.decls.push((name.to_string(), spec));
        self
    }

    /// Declarations accepted so far.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Build the list, or `None` if `status` holds errors.
    pub fn build(&self, status: &Status) -> Option<AttributeList> {
        if !status.is_ok() {
            tracing::debug!(%status, "attribute declarations failed");
            return None;
        }
        let mut map = AttributeMap::new();
        for (name, _) in &self.decls {
            let index = map.push_slot(name, None, self.owner);
            debug_assert_eq!(index + 1, map.entries());
        }
        let mut list = AttributeList::new(Arc::new(map), self.segments);
        for (index, (_, spec)) in self.decls.iter().enumerate() {
            for segment in 0..self.segments {
                list.set(index, segment, spec.zeroed(self.entries));
            }
        }
        Some(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::DataArray;

    #[test]
    fn test_parse_full_spec() {
        let spec: TypeSpec = "fpreal32[3]:point".parse().unwrap();
        assert_eq!(spec, TypeSpec::new(Storage::Real32, 3, TypeInfo::Point));
    }

    #[test]
    fn test_parse_defaults() {
        assert_eq!("int32".parse::<TypeSpec>().unwrap().tuple_size, 1);
        assert_eq!("fpreal64:normal".parse::<TypeSpec>().unwrap().tuple_size, 3);
        let s: TypeSpec = "string".parse().unwrap();
        assert_eq!(s.storage, Storage::String);
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "float128", "int32[0]", "int32[x]", "int32[3", "fpreal32:banana"] {
            let err = bad.parse::<TypeSpec>().unwrap_err();
            assert!(matches!(err, Error::InvalidTypeSpec { .. }), "{}", bad);
        }
    }

    #[test]
    fn test_attribute_names() {
        assert!(is_valid_attribute_name("P"));
        assert!(is_valid_attribute_name("_id2"));
        assert!(!is_valid_attribute_name("2d"));
        assert!(!is_valid_attribute_name("a-b"));
        assert!(!is_valid_attribute_name(""));
    }

    #[test]
    fn test_builder_accumulates() {
        let mut status = Status::new();
        let mut builder = AttributeBuilder::new(4);
        builder
            .declare("P", "fpreal32[3]:point", &mut status)
            .declare("bad name", "int32", &mut status)
            .declare("N", "fpreal32[2]:normal", &mut status)
            .declare("id", "nope", &mut status)
            .declare("P", "int8", &mut status);
        assert_eq!(status.errors().len(), 2);
        assert_eq!(status.warnings().len(), 2);
        assert_eq!(builder.len(), 2);
        assert!(builder.build(&status).is_none());
    }

    #[test]
    fn test_builder_builds() {
        let mut status = Status::new();
        let mut builder = AttributeBuilder::new(3).segments(2).owner(Owner::Point);
        builder
            .declare("P", "fpreal32[3]:point", &mut status)
            .declare("name", "string", &mut status);
        let list = builder.build(&status).unwrap();
        assert_eq!(list.segments(), 2);
        let p = list.get_by_name("P", 1).unwrap();
        assert_eq!((p.entries(), p.tuple_size(), p.type_info()), (3, 3, TypeInfo::Point));
        assert_eq!(list.find("name").unwrap().get_string(2, 0), None);
        assert_eq!(list.map().original_owner(0), Owner::Point);
    }
}
