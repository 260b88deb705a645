//! Hash table and index statistics.

/// A point-in-time view of a hash table's shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableStats {
    /// Number of buckets.
    pub buckets: usize,
    /// Number of distinct keys.
    pub keys: usize,
    /// Number of key/value associations.
    pub entries: usize,
    /// Number of times the bucket array was rebuilt.
    pub resizes: u64,
    /// Length of the longest bucket chain.
    pub longest_chain: usize,
}

impl TableStats {
    /// Keys per bucket, in percent.
    pub fn load_percent(&self) -> usize {
        if self.buckets == 0 {
            0
        } else {
            self.keys * 100 / self.buckets
        }
    }
}

/// Shape of an attribute index: its hash table plus its ordered layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub table: TableStats,
    pub tree_height: usize,
    pub tree_nodes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_percent() {
        let stats = TableStats {
            buckets: 16,
            keys: 12,
            ..TableStats::default()
        };
        assert_eq!(stats.load_percent(), 75);
        assert_eq!(TableStats::default().load_percent(), 0);
    }
}
