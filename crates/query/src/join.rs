//! Hash join over two attribute indexes.

use sos_core::{Error, Handle, Key, Result};
use sos_index::AttrIndex;
use sos_storage::{ObjectRef, ObjectStore};

/// Lazy sequence of `(handle_a, handle_b)` pairs whose keys are equal.
///
/// Implements the classic hash join:
/// 1. Build side: the index with fewer distinct keys, walked one key group
///    at a time
/// 2. Lookup side: each key is looked up in the other index's hash table
///
/// Pairs are grouped by key. Within a group they follow the bucket order of
/// side A, then side B. Group order is unspecified and may change when
/// either table resizes; callers needing a fixed order sort the result.
pub struct HashJoin<'a> {
    groups: Box<dyn Iterator<Item = (&'a Key, &'a [Handle])> + 'a>,
    lookup: &'a AttrIndex,
    /// Whether the build side is index B.
    swap: bool,
    left: &'a [Handle],
    right: &'a [Handle],
    i: usize,
    j: usize,
}

impl<'a> HashJoin<'a> {
    fn new(a: &'a AttrIndex, b: &'a AttrIndex) -> Result<Self> {
        if a.key_type() != b.key_type() {
            return Err(Error::type_mismatch(a.key_type(), b.key_type()));
        }
        let swap = b.distinct_keys() < a.distinct_keys();
        let (build, lookup) = if swap { (b, a) } else { (a, b) };
        tracing::debug!(
            build = build.name(),
            lookup = lookup.name(),
            build_keys = build.distinct_keys(),
            lookup_keys = lookup.distinct_keys(),
            "hash join"
        );
        Ok(Self {
            groups: Box::new(build.groups()),
            lookup,
            swap,
            left: &[],
            right: &[],
            i: 0,
            j: 0,
        })
    }

    /// Collects every pair, sorted. Useful where a stable order matters.
    pub fn sorted(self) -> Vec<(Handle, Handle)> {
        let mut pairs: Vec<_> = self.collect();
        pairs.sort_unstable();
        pairs
    }
}

impl Iterator for HashJoin<'_> {
    type Item = (Handle, Handle);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.i < self.left.len() {
                let pair = (self.left[self.i], self.right[self.j]);
                self.j += 1;
                if self.j == self.right.len() {
                    self.j = 0;
                    self.i += 1;
                }
                return Some(pair);
            }

            let (key, built) = self.groups.next()?;
            let matched = self.lookup.equals(key);
            if matched.is_empty() {
                continue;
            }
            (self.left, self.right) = if self.swap { (matched, built) } else { (built, matched) };
            self.i = 0;
            self.j = 0;
        }
    }
}

/// Joins two indexes on key equality.
///
/// The key types must be identical; integer widths and signedness do not
/// mix, and a composite key only joins another composite key of the same
/// number type. Both components of a composite key must match.
pub fn join<'a>(a: &'a AttrIndex, b: &'a AttrIndex) -> Result<HashJoin<'a>> {
    HashJoin::new(a, b)
}

/// Joins the named index of `store_a` with the named index of `store_b`,
/// resolving each pair to its objects.
pub fn join_objects<'a>(
    store_a: &'a ObjectStore,
    index_a: &str,
    store_b: &'a ObjectStore,
    index_b: &str,
) -> Result<impl Iterator<Item = (ObjectRef<'a>, ObjectRef<'a>)> + 'a> {
    let pairs = join(store_a.index(index_a)?, store_b.index(index_b)?)?;
    Ok(pairs.filter_map(move |(a, b)| Some((store_a.object(a).ok()?, store_b.object(b).ok()?))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sos_core::{DataType, KeyType, Value};
    use sos_index::IndexConfig;

    fn index(name: &str, keys: &[u32]) -> AttrIndex {
        let mut index = AttrIndex::new(name, KeyType::Simple(DataType::UInt32), &IndexConfig::default());
        for (slot, k) in keys.iter().enumerate() {
            index
                .add(Key::Simple(Value::UInt32(*k)), Handle::new(slot as u32, 0))
                .unwrap();
        }
        index
    }

    fn h(slot: u32) -> Handle {
        Handle::new(slot, 0)
    }

    #[test]
    fn test_pairs_keep_side_order() {
        // A has more distinct keys, so B builds and A is looked up.
        let a = index("a", &[1, 2, 3, 4]);
        let b = index("b", &[3, 3]);
        let pairs: Vec<_> = join(&a, &b).unwrap().collect();
        assert_eq!(pairs, vec![(h(2), h(0)), (h(2), h(1))]);

        let pairs: Vec<_> = join(&b, &a).unwrap().collect();
        assert_eq!(pairs, vec![(h(0), h(2)), (h(1), h(2))]);
    }

    #[test]
    fn test_cross_product_per_key() {
        let a = index("a", &[7, 7, 8]);
        let b = index("b", &[7, 7, 7, 9]);
        let pairs = join(&a, &b).unwrap().sorted();
        assert_eq!(pairs.len(), 6);
        assert!(pairs.iter().all(|(x, y)| x.slot() < 2 && y.slot() < 3));
    }

    #[test]
    fn test_empty_sides() {
        let a = index("a", &[]);
        let b = index("b", &[1, 2]);
        assert_eq!(join(&a, &b).unwrap().count(), 0);
        assert_eq!(join(&b, &a).unwrap().count(), 0);
    }

    #[test]
    fn test_key_type_mismatch_is_eager() {
        let a = index("a", &[1]);
        let b = AttrIndex::new("b", KeyType::Simple(DataType::UInt16), &IndexConfig::default());
        assert!(matches!(join(&a, &b), Err(Error::TypeMismatch { .. })));

        let c = AttrIndex::new("c", KeyType::Simple(DataType::String), &IndexConfig::default());
        assert!(matches!(join(&c, &a), Err(Error::TypeMismatch { .. })));
    }
}
