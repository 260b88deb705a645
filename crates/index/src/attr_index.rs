//! Attribute indexes.
//!
//! An [`AttrIndex`] pairs an [`H2Htbl`] (equality, join lookups, pattern
//! walks) with a [`BTreeIndex`] (min, max, ordered ranges). Both hold the
//! same `(key, handle)` associations at all times.

use crate::btree::{BTreeIndex, RangeIter};
use crate::config::IndexConfig;
use crate::htbl::H2Htbl;
use crate::range::KeyRange;
use crate::stats::IndexStats;
use sos_core::pattern_match::KeyPattern;
use sos_core::{Error, Handle, Key, KeyType, Result};

/// An index over one attribute, or one composite attribute pair, of a schema.
pub struct AttrIndex {
    name: String,
    key_type: KeyType,
    table: H2Htbl<Key, Handle>,
    tree: BTreeIndex<Key, Handle>,
}

impl AttrIndex {
    pub fn new(name: impl Into<String>, key_type: KeyType, config: &IndexConfig) -> Self {
        Self {
            name: name.into(),
            key_type,
            table: H2Htbl::with_config(config),
            tree: BTreeIndex::with_config(config),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Number of indexed handles.
    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of distinct keys.
    #[inline]
    pub fn distinct_keys(&self) -> usize {
        self.table.key_count()
    }

    fn check(&self, key: &Key) -> Result<()> {
        let got = key.key_type();
        if got == self.key_type {
            Ok(())
        } else {
            Err(Error::type_mismatch(self.key_type, got))
        }
    }

    /// Indexes `handle` under `key`. Returns false, changing nothing, when
    /// the pair is already indexed: the handles under a key form a set.
    ///
    /// The hash table is updated first since it is the only fallible step;
    /// when it fails neither structure has changed.
    pub fn add(&mut self, key: Key, handle: Handle) -> Result<bool> {
        self.check(&key)?;
        if self.table.lookup(&key).contains(&handle) {
            return Ok(false);
        }
        self.table.insert(key.clone(), handle)?;
        self.tree.insert(key, handle);
        Ok(true)
    }

    /// Removes one association of `handle` with `key` from both structures.
    pub fn remove(&mut self, key: &Key, handle: Handle) -> Result<bool> {
        self.check(key)?;
        let in_table = self.table.remove(key, &handle);
        let in_tree = self.tree.remove(key, &handle);
        debug_assert_eq!(in_table, in_tree, "index structures diverged");
        Ok(in_table)
    }

    /// Handles stored under `key`, in insertion order.
    pub fn equals(&self, key: &Key) -> &[Handle] {
        self.table.lookup(key)
    }

    /// Smallest key and the first handle stored under it.
    pub fn min(&self) -> Option<(&Key, Handle)> {
        let (key, handles) = self.tree.min()?;
        Some((key, *handles.first()?))
    }

    /// Largest key and the first handle stored under it.
    pub fn max(&self) -> Option<(&Key, Handle)> {
        let (key, handles) = self.tree.max()?;
        Some((key, *handles.first()?))
    }

    /// Every `(key, handle)` with `lo <= key <= hi`, ascending.
    pub fn range(&self, lo: &Key, hi: &Key) -> Result<RangeIter<'_, Key, Handle>> {
        self.check(lo)?;
        self.check(hi)?;
        Ok(self.tree.range(KeyRange::from(lo.clone()..=hi.clone())))
    }

    /// Ascending scan over an arbitrary key range.
    pub fn scan(&self, range: KeyRange<Key>) -> RangeIter<'_, Key, Handle> {
        self.tree.range(range)
    }

    /// Ascending scan over every entry.
    pub fn iter(&self) -> RangeIter<'_, Key, Handle> {
        self.tree.iter()
    }

    /// Entries whose key satisfies `pattern`, in key order.
    pub fn find<'a>(&'a self, pattern: &'a KeyPattern) -> impl Iterator<Item = (&'a Key, Handle)> + 'a {
        self.table
            .find_pattern(move |key| pattern.matches(key))
            .map(|(key, handle)| (key, *handle))
    }

    /// Each distinct key with its handles, in unspecified order.
    pub fn groups(&self) -> impl Iterator<Item = (&Key, &[Handle])> + '_ {
        self.table.iter()
    }

    pub fn clear(&mut self) {
        self.table.clear();
        self.tree.clear();
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            table: self.table.stats(),
            tree_height: self.tree.height(),
            tree_nodes: self.tree.node_count(),
        }
    }
}

impl core::fmt::Debug for AttrIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AttrIndex")
            .field("name", &self.name)
            .field("key_type", &self.key_type)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sos_core::{DataType, Value};

    fn id_index() -> AttrIndex {
        AttrIndex::new("id", KeyType::Simple(DataType::UInt32), &IndexConfig::default())
    }

    fn key(id: u32) -> Key {
        Key::Simple(Value::UInt32(id))
    }

    #[test]
    fn test_min_max_after_remove() {
        let mut index = id_index();
        for (slot, id) in [5u32, 1, 3].into_iter().enumerate() {
            index.add(key(id), Handle::new(slot as u32, 0)).unwrap();
        }
        assert_eq!(index.min(), Some((&key(1), Handle::new(1, 0))));
        assert_eq!(index.max(), Some((&key(5), Handle::new(0, 0))));

        assert!(index.remove(&key(5), Handle::new(0, 0)).unwrap());
        assert_eq!(index.max(), Some((&key(3), Handle::new(2, 0))));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_ties_share_a_key() {
        let mut index = id_index();
        index.add(key(7), Handle::new(0, 0)).unwrap();
        index.add(key(7), Handle::new(1, 0)).unwrap();
        assert_eq!(index.equals(&key(7)), &[Handle::new(0, 0), Handle::new(1, 0)]);
        assert_eq!(index.distinct_keys(), 1);
        assert_eq!(index.range(&key(7), &key(7)).unwrap().count(), 2);
    }

    #[test]
    fn test_repeated_pair_is_stored_once() {
        let mut index = id_index();
        assert!(index.add(key(7), Handle::new(0, 0)).unwrap());
        assert!(!index.add(key(7), Handle::new(0, 0)).unwrap());
        assert_eq!(index.equals(&key(7)), &[Handle::new(0, 0)]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.range(&key(7), &key(7)).unwrap().count(), 1);

        // One removal empties the key in both structures.
        assert!(index.remove(&key(7), Handle::new(0, 0)).unwrap());
        assert!(index.is_empty());
        assert!(index.min().is_none());
    }

    #[test]
    fn test_type_mismatch() {
        let mut index = id_index();
        let wrong = Key::Simple(Value::UInt16(1));
        let err = index.add(wrong.clone(), Handle::new(0, 0)).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert!(index.remove(&wrong, Handle::new(0, 0)).is_err());
        assert!(index.range(&wrong, &key(3)).is_err());
        assert!(index.is_empty());
    }

    #[test]
    fn test_range_inclusive() {
        let mut index = id_index();
        for id in 0..50u32 {
            index.add(key(id), Handle::new(id, 0)).unwrap();
        }
        let ids: Vec<&Key> = index.range(&key(10), &key(14)).unwrap().map(|(k, _)| k).collect();
        assert_eq!(ids, vec![&key(10), &key(11), &key(12), &key(13), &key(14)]);
        assert_eq!(index.scan(KeyRange::lower_bound(key(45), true)).count(), 4);
    }

    #[test]
    fn test_find_pattern_on_composite_keys() {
        let mut index = AttrIndex::new(
            "by_name",
            KeyType::Composite(DataType::UInt32),
            &IndexConfig::default(),
        );
        let entries = [("bob", 2u32), ("alice", 9), ("bob", 1), ("carol", 4)];
        for (slot, (name, n)) in entries.iter().enumerate() {
            let key = Key::composite(*name, Value::UInt32(*n)).unwrap();
            index.add(key, Handle::new(slot as u32, 0)).unwrap();
        }

        let bobs: Vec<String> = index
            .find(&KeyPattern::Prefix("bo".into()))
            .map(|(k, _)| k.to_string())
            .collect();
        assert_eq!(bobs, vec!["bob:1", "bob:2"]);

        let min = index.min().map(|(k, _)| k.to_string());
        assert_eq!(min.as_deref(), Some("alice:9"));
    }

    #[test]
    fn test_clear_and_stats() {
        let mut index = id_index();
        for id in 0..100u32 {
            index.add(key(id), Handle::new(id, 0)).unwrap();
        }
        let stats = index.stats();
        assert_eq!(stats.table.keys, 100);
        assert!(stats.table.resizes > 0);
        assert!(stats.tree_nodes >= 1);

        index.clear();
        assert!(index.is_empty());
        assert!(index.min().is_none());
        assert_eq!(index.groups().count(), 0);
    }
}
