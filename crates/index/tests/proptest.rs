//! Property-based tests for sos-index using proptest.

use proptest::prelude::*;
use sos_core::{DataType, Handle, Key, KeyType, Value};
use sos_index::{AttrIndex, BTreeIndex, H2Htbl, IndexConfig, KeyRange};
use std::collections::BTreeMap;

fn tiny_config() -> IndexConfig {
    IndexConfig::default()
        .with_initial_buckets(1)
        .with_btree_order(4)
}

proptest! {
    /// N inserts under unique keys leave exactly N associations, however
    /// many resizes happened on the way.
    #[test]
    fn htbl_count_survives_resize(keys in prop::collection::hash_set(any::<u32>(), 0..600)) {
        let mut table: H2Htbl<u32, u32> = H2Htbl::with_config(&tiny_config());
        for &k in &keys {
            prop_assert_eq!(table.insert(k, k ^ 0xdead).unwrap(), 1);
        }
        prop_assert_eq!(table.key_count(), keys.len());
        prop_assert_eq!(table.len(), keys.len());
        for &k in &keys {
            prop_assert_eq!(table.lookup(&k), &[k ^ 0xdead][..]);
        }
    }

    /// After insert(k, v) then remove(k, v), lookup(k) no longer holds v.
    #[test]
    fn htbl_insert_remove(pairs in prop::collection::vec((0u16..50, 0u8..4), 1..300)) {
        let mut table: H2Htbl<u16, u8> = H2Htbl::with_config(&tiny_config());
        let mut model: BTreeMap<u16, Vec<u8>> = BTreeMap::new();
        for &(k, v) in &pairs {
            table.insert(k, v).unwrap();
            model.entry(k).or_default().push(v);
        }
        for &(k, v) in pairs.iter().step_by(2) {
            prop_assert!(table.remove(&k, &v));
            let values = model.get_mut(&k).unwrap();
            let at = values.iter().position(|x| *x == v).unwrap();
            values.remove(at);
            if values.is_empty() {
                model.remove(&k);
            }
        }
        prop_assert_eq!(table.key_count(), model.len());
        for (k, values) in &model {
            prop_assert_eq!(table.lookup(k), values.as_slice());
        }
        let walked: Vec<u16> = table.find_pattern(|_| true).map(|(k, _)| *k).collect();
        let expected: Vec<u16> = model.iter().flat_map(|(k, vs)| vs.iter().map(move |_| *k)).collect();
        prop_assert_eq!(walked, expected);
    }

    /// The B+Tree agrees with a sorted model under mixed inserts and removes.
    #[test]
    fn btree_matches_model(
        keys in prop::collection::vec(0i64..400, 1..400),
        deletes in prop::collection::vec(any::<prop::sample::Index>(), 0..200),
    ) {
        let mut tree: BTreeIndex<i64, u64> = BTreeIndex::new(4);
        let mut model: BTreeMap<i64, Vec<u64>> = BTreeMap::new();
        for (i, &k) in keys.iter().enumerate() {
            tree.insert(k, i as u64);
            model.entry(k).or_default().push(i as u64);
        }
        for idx in &deletes {
            let i = idx.index(keys.len());
            let k = keys[i];
            let removed = tree.remove(&k, &(i as u64));
            let in_model = model.get_mut(&k).and_then(|vs| {
                let at = vs.iter().position(|v| *v == i as u64)?;
                vs.remove(at);
                Some(())
            }).is_some();
            if model.get(&k).is_some_and(Vec::is_empty) {
                model.remove(&k);
            }
            prop_assert_eq!(removed, in_model);
        }

        let scanned: Vec<(i64, u64)> = tree.iter().map(|(k, v)| (*k, v)).collect();
        let expected: Vec<(i64, u64)> = model
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (*k, *v)))
            .collect();
        prop_assert_eq!(scanned, expected);
        prop_assert_eq!(tree.min().map(|(k, _)| *k), model.keys().next().copied());
        prop_assert_eq!(tree.max().map(|(k, _)| *k), model.keys().next_back().copied());
    }

    /// Range scans return exactly the keys within inclusive bounds, ascending.
    #[test]
    fn btree_range_matches_filter(
        keys in prop::collection::vec(0i32..1000, 0..300),
        lo in 0i32..1000,
        span in 0i32..300,
    ) {
        let mut tree: BTreeIndex<i32, u32> = BTreeIndex::new(6);
        for &k in &keys {
            tree.insert(k, 0);
        }
        let hi = lo + span;
        let got: Vec<i32> = tree
            .range(KeyRange::bound(lo, hi, false, false))
            .map(|(k, _)| *k)
            .collect();
        let mut expected: Vec<i32> = keys.iter().copied().filter(|k| *k >= lo && *k <= hi).collect();
        expected.sort_unstable();
        prop_assert_eq!(got, expected);
    }

    /// min <= every key <= max, and removing the min exposes the
    /// second-smallest key.
    #[test]
    fn index_min_max(ids in prop::collection::vec(any::<i64>(), 2..200)) {
        let mut index = AttrIndex::new("v", KeyType::Simple(DataType::Int64), &tiny_config());
        for (slot, &id) in ids.iter().enumerate() {
            index.add(Key::Simple(Value::Int64(id)), Handle::new(slot as u32, 0)).unwrap();
        }
        let (min_key, min_handle) = index.min().map(|(k, h)| (k.clone(), h)).unwrap();
        let (max_key, _) = index.max().map(|(k, h)| (k.clone(), h)).unwrap();
        for (key, _) in index.iter() {
            prop_assert!(&min_key <= key && key <= &max_key);
        }

        index.remove(&min_key, min_handle).unwrap();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        let new_min = index.min().map(|(k, _)| k.clone());
        prop_assert_eq!(new_min, Some(Key::Simple(Value::Int64(sorted[1]))));
    }
}
