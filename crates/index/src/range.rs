//! Key ranges for ordered scans.
//!
//! A [`KeyRange`] is a pair of [`Bound`]s. Index lookups build closed
//! ranges (`lo..=hi`); condition filters build half-open or exclusive ones
//! from `<`/`>` comparisons.

use std::ops::{Bound, RangeBounds, RangeInclusive};

/// Keys selected by a lower and an upper bound.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyRange<K> {
    lower: Bound<K>,
    upper: Bound<K>,
}

impl<K: Ord> KeyRange<K> {
    pub fn new(lower: Bound<K>, upper: Bound<K>) -> Self {
        Self { lower, upper }
    }

    /// Every key.
    pub fn all() -> Self {
        Self::new(Bound::Unbounded, Bound::Unbounded)
    }

    /// Exactly `key`.
    pub fn only(key: K) -> Self
    where
        K: Clone,
    {
        Self::new(Bound::Included(key.clone()), Bound::Included(key))
    }

    /// Keys at or above `value`, or strictly above when `exclusive`.
    pub fn lower_bound(value: K, exclusive: bool) -> Self {
        Self::new(edge(value, exclusive), Bound::Unbounded)
    }

    /// Keys at or below `value`, or strictly below when `exclusive`.
    pub fn upper_bound(value: K, exclusive: bool) -> Self {
        Self::new(Bound::Unbounded, edge(value, exclusive))
    }

    pub fn bound(lower: K, upper: K, lower_exclusive: bool, upper_exclusive: bool) -> Self {
        Self::new(edge(lower, lower_exclusive), edge(upper, upper_exclusive))
    }

    /// The closed range `[lo, hi]`, with either end optional.
    pub fn inclusive(lo: Option<K>, hi: Option<K>) -> Self {
        let closed = |k: Option<K>| k.map_or(Bound::Unbounded, Bound::Included);
        Self::new(closed(lo), closed(hi))
    }

    pub fn is_all(&self) -> bool {
        matches!(
            (&self.lower, &self.upper),
            (Bound::Unbounded, Bound::Unbounded)
        )
    }

    /// The key an ascending scan should start from, if bounded below.
    pub fn start(&self) -> Option<&K> {
        match &self.lower {
            Bound::Included(k) | Bound::Excluded(k) => Some(k),
            Bound::Unbounded => None,
        }
    }

    /// Returns true when `key` lies before the lower end of the range.
    pub fn is_below(&self, key: &K) -> bool {
        match &self.lower {
            Bound::Included(lo) => key < lo,
            Bound::Excluded(lo) => key <= lo,
            Bound::Unbounded => false,
        }
    }

    /// Returns true when `key` lies past the upper end of the range, so an
    /// ascending scan can stop.
    pub fn is_above(&self, key: &K) -> bool {
        match &self.upper {
            Bound::Included(hi) => key > hi,
            Bound::Excluded(hi) => key >= hi,
            Bound::Unbounded => false,
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        !self.is_below(key) && !self.is_above(key)
    }
}

fn edge<K>(value: K, exclusive: bool) -> Bound<K> {
    if exclusive {
        Bound::Excluded(value)
    } else {
        Bound::Included(value)
    }
}

impl<K: Ord> From<RangeInclusive<K>> for KeyRange<K> {
    fn from(range: RangeInclusive<K>) -> Self {
        let (lo, hi) = range.into_inner();
        Self::new(Bound::Included(lo), Bound::Included(hi))
    }
}

impl<K> RangeBounds<K> for KeyRange<K> {
    fn start_bound(&self) -> Bound<&K> {
        self.lower.as_ref()
    }

    fn end_bound(&self) -> Bound<&K> {
        self.upper.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sos_core::{Key, Value};

    fn id(n: u32) -> Key {
        Key::Simple(Value::UInt32(n))
    }

    fn node(text: &str, job: u64) -> Key {
        Key::composite(text, Value::UInt64(job)).unwrap()
    }

    #[test]
    fn test_closed_range_from_index_lookup() {
        let range = KeyRange::from(id(10)..=id(30));
        assert!(range.contains(&id(10)));
        assert!(range.contains(&id(30)));
        assert!(range.is_below(&id(9)));
        assert!(range.is_above(&id(31)));
        assert_eq!(range.start(), Some(&id(10)));
        assert_eq!(range, KeyRange::inclusive(Some(id(10)), Some(id(30))));
    }

    #[test]
    fn test_strict_bounds_from_conditions() {
        // ts > 10 && ts < 30
        let range = KeyRange::bound(id(10), id(30), true, true);
        assert!(!range.contains(&id(10)));
        assert!(range.contains(&id(11)));
        assert!(range.is_above(&id(30)));
        // A strict lower bound still starts the scan at its key.
        assert_eq!(range.start(), Some(&id(10)));
    }

    #[test]
    fn test_open_ends() {
        let from = KeyRange::inclusive(Some(id(5)), None);
        assert!(!from.is_above(&id(u32::MAX)));
        assert!(from.is_below(&id(4)));

        let upto = KeyRange::upper_bound(id(5), false);
        assert_eq!(upto.start(), None);
        assert!(upto.contains(&id(0)));
        assert!(upto.is_above(&id(6)));

        assert!(KeyRange::<Key>::inclusive(None, None).is_all());
        assert!(KeyRange::<Key>::all().contains(&id(0)));
    }

    #[test]
    fn test_composite_keys_order_text_first() {
        let range = KeyRange::only(node("node1", 7));
        assert!(range.contains(&node("node1", 7)));
        assert!(range.is_above(&node("node1", 8)));
        assert!(range.is_below(&node("node0", 99)));

        let node1 = KeyRange::from(node("node1", 0)..=node("node1", u64::MAX));
        assert!(node1.contains(&node("node1", 12)));
        assert!(node1.is_above(&node("node2", 0)));
    }

    #[test]
    fn test_inverted_range_holds_nothing() {
        let range = KeyRange::from(id(30)..=id(10));
        assert!((0..40).all(|n| !range.contains(&id(n))));
    }

    #[test]
    fn test_range_bounds_view() {
        let range = KeyRange::lower_bound(id(3), true);
        assert_eq!(range.start_bound(), Bound::Excluded(&id(3)));
        assert_eq!(range.end_bound(), Bound::Unbounded);
    }
}
