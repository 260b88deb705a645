//! H2HTBL: a dynamic, chained hash table mapping a key to a bucket of values.
//!
//! Each key owns one entry holding every value associated with it, in
//! insertion order. Entries are chained per bucket; the bucket array is a
//! power of two and doubles once the number of distinct keys crosses the
//! configured load factor. Resizing moves every entry into a freshly
//! allocated array before the table is touched, so no caller ever observes
//! a half-migrated table.
//!
//! Iteration borrows the table. Mutating while an iterator is alive is
//! rejected at compile time; callers that need to mutate must collect first.

use crate::config::IndexConfig;
use crate::stats::TableStats;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;
use sos_core::{Error, Result};

struct Entry<K, V> {
    hash: u64,
    key: K,
    values: Vec<V>,
}

type Bucket<K, V> = Vec<Entry<K, V>>;

/// A resizable hash table from keys to value sets.
pub struct H2Htbl<K, V, S = DefaultHashBuilder> {
    buckets: Vec<Bucket<K, V>>,
    hasher: S,
    keys: usize,
    entries: usize,
    resizes: u64,
    min_buckets: usize,
    load_factor: usize,
    grow_retries: u32,
}

impl<K: Eq + Hash, V: PartialEq> H2Htbl<K, V> {
    /// Creates a table with the default configuration.
    pub fn new() -> Self {
        Self::with_config(&IndexConfig::default())
    }

    /// Creates a table sized and tuned by `config`.
    pub fn with_config(config: &IndexConfig) -> Self {
        Self::with_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K: Eq + Hash, V: PartialEq> Default for H2Htbl<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V: PartialEq, S: BuildHasher> H2Htbl<K, V, S> {
    /// Creates a table with an explicit hasher.
    pub fn with_hasher(config: &IndexConfig, hasher: S) -> Self {
        let count = config.bucket_count();
        Self {
            buckets: empty_buckets(count),
            hasher,
            keys: 0,
            entries: 0,
            resizes: 0,
            min_buckets: count,
            load_factor: config.load_factor(),
            grow_retries: config.grow_retries,
        }
    }

    /// Number of key/value associations.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Number of distinct keys.
    #[inline]
    pub fn key_count(&self) -> usize {
        self.keys
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    fn slot(&self, hash: u64) -> usize {
        (hash as usize) & (self.buckets.len() - 1)
    }

    fn find_entry(&self, key: &K) -> Option<&Entry<K, V>> {
        let hash = self.hasher.hash_one(key);
        self.buckets[self.slot(hash)]
            .iter()
            .find(|e| e.hash == hash && e.key == *key)
    }

    /// Associates `value` with `key` and returns how many values the key
    /// now holds.
    ///
    /// Fails only when growing the bucket array cannot allocate, after the
    /// configured number of retries. The table is unchanged on failure.
    pub fn insert(&mut self, key: K, value: V) -> Result<usize> {
        let hash = self.hasher.hash_one(&key);
        let slot = self.slot(hash);
        if let Some(entry) = self.buckets[slot]
            .iter_mut()
            .find(|e| e.hash == hash && e.key == key)
        {
            entry.values.push(value);
            self.entries += 1;
            return Ok(entry.values.len());
        }

        if (self.keys + 1) * 100 > self.buckets.len() * self.load_factor {
            self.resize(self.buckets.len() * 2)?;
        }
        let slot = self.slot(hash);
        self.buckets[slot].push(Entry {
            hash,
            key,
            values: vec![value],
        });
        self.keys += 1;
        self.entries += 1;
        Ok(1)
    }

    /// Returns every value associated with `key`; empty when absent.
    pub fn lookup(&self, key: &K) -> &[V] {
        self.find_entry(key).map(|e| e.values.as_slice()).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find_entry(key).is_some()
    }

    /// Removes exactly one association of `value` with `key`.
    ///
    /// Returns whether it existed. Removing the last value of a key removes
    /// the key itself.
    pub fn remove(&mut self, key: &K, value: &V) -> bool {
        let hash = self.hasher.hash_one(key);
        let slot = self.slot(hash);
        let bucket = &mut self.buckets[slot];
        let Some(at) = bucket.iter().position(|e| e.hash == hash && e.key == *key) else {
            return false;
        };
        let Some(pos) = bucket[at].values.iter().position(|v| v == value) else {
            return false;
        };
        bucket[at].values.remove(pos);
        self.entries -= 1;
        if bucket[at].values.is_empty() {
            bucket.swap_remove(at);
            self.keys -= 1;
            self.maybe_shrink();
        }
        true
    }

    /// Removes a key and every value associated with it.
    pub fn remove_key(&mut self, key: &K) -> Option<Vec<V>> {
        let hash = self.hasher.hash_one(key);
        let slot = self.slot(hash);
        let bucket = &mut self.buckets[slot];
        let at = bucket.iter().position(|e| e.hash == hash && e.key == *key)?;
        let entry = bucket.swap_remove(at);
        self.keys -= 1;
        self.entries -= entry.values.len();
        self.maybe_shrink();
        Some(entry.values)
    }

    /// Drops every entry and returns to the initial bucket count.
    pub fn clear(&mut self) {
        self.buckets = empty_buckets(self.min_buckets);
        self.keys = 0;
        self.entries = 0;
    }

    /// Iterates keys with their values, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[V])> + '_ {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.iter().map(|e| (&e.key, e.values.as_slice())))
    }

    /// Returns a snapshot of the table's shape.
    pub fn stats(&self) -> TableStats {
        TableStats {
            buckets: self.buckets.len(),
            keys: self.keys,
            entries: self.entries,
            resizes: self.resizes,
            longest_chain: self.buckets.iter().map(Vec::len).max().unwrap_or(0),
        }
    }

    /// Halves the bucket array once it is mostly empty. Best effort: a failed
    /// allocation simply leaves the table as it is.
    fn maybe_shrink(&mut self) {
        let buckets = self.buckets.len();
        if buckets > self.min_buckets && self.keys * 400 < buckets * self.load_factor {
            self.resize_best_effort(buckets / 2);
        }
    }

    /// Resizes when the bucket array can be allocated. On failure the table
    /// keeps its current buckets, which stay valid.
    fn resize_best_effort(&mut self, new_count: usize) {
        if let Err(e) = self.resize(new_count) {
            tracing::debug!(
                buckets = self.buckets.len(),
                target = new_count,
                keys = self.keys,
                error = %e,
                "hash table resize skipped"
            );
        }
    }

    fn resize(&mut self, new_count: usize) -> Result<()> {
        let mut fresh = self.allocate(new_count)?;
        let mask = new_count - 1;
        for bucket in self.buckets.drain(..) {
            for entry in bucket {
                fresh[(entry.hash as usize) & mask].push(entry);
            }
        }
        self.buckets = fresh;
        self.resizes += 1;
        tracing::debug!(
            buckets = new_count,
            keys = self.keys,
            entries = self.entries,
            "hash table resized"
        );
        Ok(())
    }

    fn allocate(&self, count: usize) -> Result<Vec<Bucket<K, V>>> {
        let mut attempt = 0;
        loop {
            let mut fresh: Vec<Bucket<K, V>> = Vec::new();
            match fresh.try_reserve_exact(count) {
                Ok(()) => {
                    fresh.resize_with(count, Vec::new);
                    return Ok(fresh);
                }
                Err(e) if attempt < self.grow_retries => {
                    attempt += 1;
                    tracing::warn!(buckets = count, attempt, error = %e, "bucket allocation failed, retrying");
                }
                Err(e) => {
                    return Err(Error::resource_exhausted(format!(
                        "cannot allocate {} hash buckets: {}",
                        count, e
                    )));
                }
            }
        }
    }
}

impl<K: Eq + Hash + Ord, V: PartialEq, S: BuildHasher> H2Htbl<K, V, S> {
    /// Visits every (key, value) pair whose key satisfies `pred`, in key
    /// order; values of one key come out in insertion order.
    ///
    /// The walk starts from scratch on every call and borrows the table, so
    /// the table cannot change while the sequence is consumed.
    pub fn find_pattern<P>(&self, mut pred: P) -> PatternIter<'_, K, V>
    where
        P: FnMut(&K) -> bool,
    {
        let mut matched: Vec<(&K, &[V])> = self.iter().filter(|(k, _)| pred(*k)).collect();
        matched.sort_by(|a, b| a.0.cmp(b.0));
        PatternIter {
            matched: matched.into_iter(),
            current: None,
        }
    }
}

fn empty_buckets<K, V>(count: usize) -> Vec<Bucket<K, V>> {
    let mut buckets = Vec::with_capacity(count);
    buckets.resize_with(count, Vec::new);
    buckets
}

/// Key-ordered walk over the entries selected by [`H2Htbl::find_pattern`].
pub struct PatternIter<'a, K, V> {
    matched: std::vec::IntoIter<(&'a K, &'a [V])>,
    current: Option<(&'a K, core::slice::Iter<'a, V>)>,
}

impl<'a, K, V> Iterator for PatternIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, values)) = self.current.as_mut() {
                if let Some(v) = values.next() {
                    return Some((*key, v));
                }
            }
            let (key, values) = self.matched.next()?;
            self.current = Some((key, values.iter()));
        }
    }
}
