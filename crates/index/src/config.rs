//! Tuning knobs for hash tables and indexes.

use serde::{Deserialize, Serialize};

/// Configuration shared by every index of a store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Initial hash table bucket count, rounded up to a power of two.
    pub initial_buckets: usize,
    /// The table doubles once `keys * 100 > buckets * load_factor_percent`.
    pub load_factor_percent: u8,
    /// Maximum keys per B+Tree node.
    pub btree_order: usize,
    /// Extra attempts at allocating a grown bucket array before giving up.
    pub grow_retries: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            initial_buckets: 16,
            load_factor_percent: 75,
            btree_order: 64,
            grow_retries: 3,
        }
    }
}

impl IndexConfig {
    pub fn with_initial_buckets(mut self, buckets: usize) -> Self {
        self.initial_buckets = buckets;
        self
    }

    pub fn with_load_factor_percent(mut self, percent: u8) -> Self {
        self.load_factor_percent = percent;
        self
    }

    pub fn with_btree_order(mut self, order: usize) -> Self {
        self.btree_order = order;
        self
    }

    pub fn with_grow_retries(mut self, retries: u32) -> Self {
        self.grow_retries = retries;
        self
    }

    /// Bucket count actually used for a new table.
    pub(crate) fn bucket_count(&self) -> usize {
        self.initial_buckets.max(1).next_power_of_two()
    }

    /// Load factor clamped to a usable range.
    pub(crate) fn load_factor(&self) -> usize {
        usize::from(self.load_factor_percent.clamp(10, 100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IndexConfig::default();
        assert_eq!(config.bucket_count(), 16);
        assert_eq!(config.load_factor(), 75);
        assert_eq!(config.btree_order, 64);
    }

    #[test]
    fn test_normalisation() {
        let config = IndexConfig::default()
            .with_initial_buckets(0)
            .with_load_factor_percent(250);
        assert_eq!(config.bucket_count(), 1);
        assert_eq!(config.load_factor(), 100);
        assert_eq!(IndexConfig::default().with_initial_buckets(100).bucket_count(), 128);
    }
}
