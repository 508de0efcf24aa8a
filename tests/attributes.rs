//! Attribute maps, lists and merges through the public API.

use std::sync::Arc;

use geoprim::prelude::*;

fn floats(values: Vec<f32>) -> DataArrayHandle {
    Arc::new(NumericArray::new(values, 1))
}

fn list(names: &[&str], len: usize) -> AttributeList {
    AttributeList::from_arrays(
        names
            .iter()
            .enumerate()
            .map(|(i, name)| (*name, floats(vec![i as f32; len]))),
    )
}

#[test]
fn test_map_add_twice() {
    let mut map = AttributeMap::new();
    assert_eq!(map.add("P", false), Some(0));
    assert_eq!(map.add("N", false), Some(1));
    assert_eq!(map.add("P", false), Some(0));
    assert_eq!(map.entries(), 2);

    map.set_export_name(0, "position");
    assert_eq!(map.add("P", true), None);
    assert_eq!(map.export_name(0), Some("P"));
    assert_eq!(map.entries(), 2);
}

#[test]
fn test_merge_shared_name() {
    let m1 = AttributeMap::from_names(["a", "b"]);
    let m2 = AttributeMap::from_names(["b", "c"]);
    let merge = AttributeMerge::new(&m1, &m2);

    assert_eq!(merge.entries(), 3);
    assert_eq!(merge.map().names(), &["a", "b", "c"]);
    assert_eq!(merge.dest_index(1, MergeSource::First), Some(1));
    assert_eq!(merge.dest_index(0, MergeSource::Second), Some(1));
    assert_eq!(merge.dest_index(1, MergeSource::Second), Some(2));
    assert!(merge.is_superseded(0));
    assert!(!merge.is_superseded(1));
    assert_eq!(merge.source(2), Some((MergeSource::Second, 1)));
}

#[test]
fn test_list_merge_priority() {
    let first = list(&["a", "b"], 3);
    let second = list(&["b", "c"], 3);
    let merged = first.merge(&second);

    assert_eq!(merged.entries(), 3);
    // "b" is slot 1 in the first list, so its value is 1.0
    assert_eq!(merged.find("b").map(|a| a.get_f32(0, 0)), Some(1.0));
    assert_eq!(merged.find("c").map(|a| a.get_f32(0, 0)), Some(1.0));
    assert_eq!(merged.array_entries(), Some(3));
}

#[test]
fn test_constant_expansion() {
    let varying = list(&["P"], 4);
    let detail = AttributeList::from_arrays([("Cd", floats(vec![0.5]))]);
    let merged = varying.merge_expand_constant(&detail, 4);
    let cd = merged.find("Cd").cloned().unwrap();
    assert_eq!(cd.entries(), 4);
    assert_eq!(cd.to_f64_vec(), vec![0.5; 4]);
}

#[test]
fn test_views_over_lists() {
    let base = AttributeList::from_arrays([("id", floats(vec![0.0, 1.0, 2.0, 3.0, 4.0]))]);

    let sub = base.create_sub_array(1, 3);
    assert_eq!(sub.find("id").unwrap().to_f64_vec(), vec![1.0, 2.0, 3.0]);

    let picks: DataArrayHandle = Arc::new(NumericArray::new(vec![4i32, 0, 4], 1));
    let gathered = base.create_indirect(&picks);
    assert_eq!(gathered.find("id").unwrap().to_f64_vec(), vec![4.0, 0.0, 4.0]);

    let hardened = gathered.harden_all_arrays();
    assert!(hardened.find("id").unwrap().is_hardened());

    let joined = AttributeList::concatenate_lists(&[Some(Arc::new(sub)), None, Some(Arc::new(gathered))])
        .unwrap();
    assert_eq!(joined.array_entries(), Some(6));
}

#[test]
fn test_data_id_hash_tracks_contents() {
    let a = AttributeList::from_arrays([("x", floats(vec![1.0]))]);
    assert_eq!(a.data_id_hash(0), None);

    let versioned: DataArrayHandle = Arc::new(NumericArray::new(vec![1.0f32], 1).with_data_id(next_data_id()));
    let b = AttributeList::from_arrays([("x", versioned.clone())]);
    let c = AttributeList::from_arrays([("x", versioned)]);
    assert!(b.data_id_hash(7).is_some());
    assert_eq!(b.data_id_hash(7), c.data_id_hash(7));
}

#[test]
fn test_builder() {
    let mut status = Status::new();
    let mut builder = AttributeBuilder::new(8);
    builder
        .declare("P", "fpreal32[3]:point", &mut status)
        .declare("name", "string", &mut status)
        .declare("P", "int32", &mut status);
    assert!(status.is_ok());
    assert!(status.has_warnings());
    assert_eq!(builder.len(), 2);

    let built = builder.build(&status).unwrap();
    let p = built.find("P").unwrap();
    assert_eq!(p.entries(), 8);
    assert_eq!(p.tuple_size(), 3);
    assert_eq!(p.type_info(), TypeInfo::Point);
    assert_eq!(built.find("name").unwrap().get_string(0, 0), None);

    builder.declare("bad name", "int32", &mut status);
    assert!(!status.is_ok());
    assert!(builder.build(&status).is_none());
}

#[test]
fn test_describe_as_json() {
    let p: DataArrayHandle = Arc::new(
        NumericArray::from_tuples(&[[0.0f32, 1.0, 2.0]]).with_type_info(TypeInfo::Point),
    );
    let described = AttributeList::from_arrays([("P", p)]).describe();
    let json = serde_json::to_value(&described).unwrap();
    assert_eq!(json[0]["name"], "P");
    assert_eq!(json[0]["storage"], "fpreal32");
    assert_eq!(json[0]["tuple_size"], 3);
    assert_eq!(json[0]["type_info"], "point");
}

#[test]
fn test_from_provider() {
    let provider = MemoryProvider::new().with_list(Owner::Point, list(&["P", "v"], 6));
    let mut status = Status::new();
    let extracted = AttributeList::from_provider(
        &provider,
        Owner::Point,
        Some(&["v", "missing"]),
        &IndexMapping::Range { start: 2, length: 3 },
        &mut status,
    )
    .unwrap();
    assert!(status.is_ok());
    assert!(status.has_warnings());
    assert_eq!(extracted.entries(), 1);
    assert_eq!(extracted.array_entries(), Some(3));
}
