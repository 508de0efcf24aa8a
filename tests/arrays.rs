//! Data array views against their flat equivalents.

use std::sync::Arc;

use geoprim::prelude::*;
use proptest::prelude::*;

fn ints(values: Vec<i32>) -> DataArrayHandle {
    Arc::new(NumericArray::new(values, 1))
}

fn floats(values: Vec<f32>, tuple_size: usize) -> DataArrayHandle {
    Arc::new(NumericArray::new(values, tuple_size))
}

/// Every view over `data` that is easy to build from a few numbers.
fn views(data: &DataArrayHandle, picks: &[usize], start: usize, len: usize) -> Vec<DataArrayHandle> {
    let n = data.entries();
    let indices: Vec<i32> = picks.iter().map(|p| (p % n) as i32).collect();
    let start = start % n;
    let len = len % (n - start + 1);
    let reversed: DataArrayHandle =
        Arc::new(IndirectArray::new(ints((0..n as i32).rev().collect()), data.clone()));
    vec![
        Arc::new(IndirectArray::new(ints(indices.clone()), data.clone())),
        // composes with the inner gather
        Arc::new(IndirectArray::new(ints(indices.clone()), reversed.clone())),
        Arc::new(IndirectArray::with_threshold(ints(indices), reversed, 0)),
        Arc::new(SubArray::new(data.clone(), start, len)),
        Arc::new(ConstantArray::new(data.clone(), start, len + 1)),
        Arc::new(ListArray::new(vec![data.clone(), data.clone()]).unwrap()),
    ]
}

#[test]
fn test_range_arrays() {
    let up = RangeArray::new(3, 6);
    assert_eq!(up.entries(), 3);
    assert_eq!(up.to_f64_vec(), vec![3.0, 4.0, 5.0]);

    let down = RangeArray::with_step(4, 0, -1);
    assert_eq!(down.entries(), 4);
    assert_eq!(down.to_f64_vec(), vec![4.0, 3.0, 2.0, 1.0]);

    assert_eq!(RangeArray::with_step(0, 5, -1).entries(), 0);
}

#[test]
fn test_count_offsets() {
    let counts = CountArray::new(&[3, 4, 2]);
    assert_eq!(counts.entries(), 3);
    assert_eq!(counts.offset(0), 0);
    assert_eq!(counts.offset(1), 3);
    assert_eq!(counts.offset(2), 7);
    assert_eq!(counts.sum_counts(), 9);
    assert_eq!(counts.array_index(5), Some(1));
    assert_eq!(counts.array_index(9), None);
}

#[test]
fn test_list_concatenates() {
    let list = ListArray::new(vec![ints(vec![1, 2]), ints(vec![3]), ints(vec![4, 5, 6])]).unwrap();
    assert_eq!(list.entries(), 6);
    assert_eq!(list.to_f64_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(list.locate(3), (2, 0));
}

#[test]
fn test_gather() {
    let data = ints(vec![10, 20, 30, 40, 50]);
    let view = IndirectArray::new(ints(vec![1, 4, 2, 3]), data);
    assert_eq!(view.get_i32(0, 0), 20);
    assert_eq!(view.get_i32(1, 0), 50);
    assert_eq!(view.get_i32(3, 0), 40);
}

#[test]
fn test_constant_broadcast() {
    let value = ConstantValueArray::new(4, &[1.0f32, 2.0, 3.0]);
    for i in 0..4 {
        assert_eq!(value.get_f32(i, 2), 3.0);
    }
    let source = floats(vec![0.0, 0.5, 1.0, 1.5], 2);
    let constant = ConstantArray::new(source, 1, 3);
    assert_eq!(constant.entries(), 3);
    assert_eq!(constant.to_f64_vec(), vec![1.0, 1.5, 1.0, 1.5, 1.0, 1.5]);
}

#[test]
fn test_mixed_signedness_list_hardens_exactly() {
    let cases: Vec<(DataArrayHandle, DataArrayHandle, Storage)> = vec![
        (Arc::new(NumericArray::new(vec![4_000_000_000u32], 1)), ints(vec![-1]), Storage::Int64),
        (
            Arc::new(NumericArray::new(vec![200u8], 1)),
            Arc::new(NumericArray::new(vec![-1i8], 1)),
            Storage::Int16,
        ),
    ];
    for (unsigned, signed, expected) in cases {
        let list: DataArrayHandle = Arc::new(ListArray::new(vec![unsigned, signed]).unwrap());
        assert_eq!(list.storage(), expected);
        let flat = harden(&list);
        for i in 0..list.entries() {
            assert_eq!(flat.get_i64(i, 0), list.get_i64(i, 0));
        }
        assert!(flat.is_equal(list.as_ref()));
    }

    let wide: DataArrayHandle = Arc::new(NumericArray::new(vec![u64::MAX], 1));
    let err = ListArray::new(vec![wide, ints(vec![-1])]).unwrap_err();
    assert!(matches!(err, Error::StorageMismatch { .. }));
}

#[test]
fn test_strings_through_views() {
    let names: DataArrayHandle = Arc::new(IndexedStringArray::from_strings(["a", "b", "c"], 1));
    let gathered: DataArrayHandle = Arc::new(IndirectArray::new(ints(vec![2, 0]), names.clone()));
    assert_eq!(gathered.get_string(0, 0), Some("c"));
    let flat = harden(&gathered);
    assert!(flat.is_hardened());
    assert_eq!(flat.to_strings(), vec![Some("c".to_string()), Some("a".to_string())]);
}

proptest! {
    #[test]
    fn prop_harden_preserves_values(
        data in prop::collection::vec(-1000.0f32..1000.0, 3..24),
        picks in prop::collection::vec(0usize..64, 1..16),
        start in 0usize..32,
        len in 0usize..32,
    ) {
        let tuples = data.len() / 3;
        let data = floats(data[..tuples * 3].to_vec(), 3);
        for view in views(&data, &picks, start, len) {
            let flat = harden(&view);
            prop_assert!(flat.is_hardened());
            prop_assert!(flat.is_equal(view.as_ref()));
        }
    }

    #[test]
    fn prop_harden_preserves_integers(
        wide in prop::collection::vec(any::<i64>(), 1..16),
        unsigned in prop::collection::vec(any::<u64>(), 1..16),
        small in prop::collection::vec(any::<u8>(), 1..16),
        picks in prop::collection::vec(0usize..64, 1..16),
        start in 0usize..32,
        len in 0usize..32,
    ) {
        let arrays: Vec<DataArrayHandle> = vec![
            Arc::new(NumericArray::new(wide.clone(), 1)),
            Arc::new(NumericArray::new(unsigned.clone(), 1)),
            Arc::new(NumericArray::new(small.clone(), 1)),
        ];
        for data in &arrays {
            for view in views(data, &picks, start, len) {
                let flat = harden(&view);
                prop_assert_eq!(flat.storage(), view.storage());
                prop_assert!(flat.is_equal(view.as_ref()));
            }
        }

        let mixed: DataArrayHandle = Arc::new(
            ListArray::new(vec![
                Arc::new(NumericArray::new(small.clone(), 1)),
                Arc::new(NumericArray::new(small.iter().map(|&v| v as i8).collect(), 1)),
                Arc::new(NumericArray::new(wide.clone(), 1)),
                Arc::new(NumericArray::new(unsigned.iter().map(|&v| v as u32).collect(), 1)),
            ])
            .unwrap(),
        );
        prop_assert_eq!(mixed.storage(), Storage::Int64);
        let flat = harden(&mixed);
        prop_assert!(flat.is_equal(mixed.as_ref()));
        for i in 0..mixed.entries() {
            prop_assert_eq!(flat.get_i64(i, 0), mixed.get_i64(i, 0));
        }
    }

    #[test]
    fn prop_gather_matches_definition(
        data in prop::collection::vec(any::<i32>(), 1..32),
        picks in prop::collection::vec(0usize..32, 0..32),
    ) {
        let n = data.len();
        let indices: Vec<i32> = picks.iter().map(|p| (p % n) as i32).collect();
        let view = IndirectArray::new(ints(indices.clone()), ints(data.clone()));
        prop_assert_eq!(view.entries(), indices.len());
        for (i, &idx) in indices.iter().enumerate() {
            prop_assert_eq!(view.get_i32(i, 0), data[idx as usize]);
        }
    }

    #[test]
    fn prop_count_offsets_are_prefix_sums(counts in prop::collection::vec(0i64..16, 0..32)) {
        let array = CountArray::new(&counts);
        let mut sum = 0;
        for (k, &c) in counts.iter().enumerate() {
            prop_assert_eq!(array.offset(k), sum);
            prop_assert_eq!(array.count(k), c);
            sum += c;
        }
        prop_assert_eq!(array.sum_counts(), sum);
    }
}
