//! B+Tree node definitions.

/// Node identifier in the B+Tree arena.
pub type NodeId = usize;

/// A node in the B+Tree.
#[derive(Clone, Debug)]
pub struct Node<K, V> {
    /// Keys stored in this node, ascending and distinct.
    pub keys: Vec<K>,
    /// For leaf nodes: the values associated with each key, in insertion
    /// order. Empty for internal nodes.
    pub values: Vec<Vec<V>>,
    /// For internal nodes: child node IDs. Empty for leaves.
    pub children: Vec<NodeId>,
    /// For leaf nodes: the next leaf in key order.
    pub next: Option<NodeId>,
    /// For leaf nodes: the previous leaf in key order.
    pub prev: Option<NodeId>,
    pub is_leaf: bool,
    pub parent: Option<NodeId>,
}

impl<K: Ord, V> Node<K, V> {
    pub fn new_leaf() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
            children: Vec::new(),
            next: None,
            prev: None,
            is_leaf: true,
            parent: None,
        }
    }

    pub fn new_internal() -> Self {
        Self {
            is_leaf: false,
            ..Self::new_leaf()
        }
    }

    #[inline]
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Position where `key` is or would be inserted.
    #[inline]
    pub fn find_key_position(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k < key)
    }

    /// Exact position of `key`, if present.
    pub fn find_key(&self, key: &K) -> Option<usize> {
        let pos = self.find_key_position(key);
        (pos < self.keys.len() && self.keys[pos] == *key).then_some(pos)
    }

    /// Inserts into a leaf, appending to the key's values when it exists.
    pub fn insert_at(&mut self, pos: usize, key: K, value: V) {
        debug_assert!(self.is_leaf);
        if pos < self.keys.len() && self.keys[pos] == key {
            self.values[pos].push(value);
        } else {
            self.keys.insert(pos, key);
            self.values.insert(pos, vec![value]);
        }
    }

    /// Resets a node so its arena slot can be reused.
    pub fn reset(&mut self) {
        self.keys.clear();
        self.values.clear();
        self.children.clear();
        self.next = None;
        self.prev = None;
        self.parent = None;
    }
}

impl<K: Ord, V: PartialEq> Node<K, V> {
    /// Removes one occurrence of `value` under the key at `pos`, dropping
    /// the key once it has no values left. Returns whether anything was
    /// removed.
    pub fn remove_at(&mut self, pos: usize, value: &V) -> bool {
        debug_assert!(self.is_leaf);
        let values = &mut self.values[pos];
        let Some(at) = values.iter().position(|v| v == value) else {
            return false;
        };
        values.remove(at);
        if values.is_empty() {
            self.keys.remove(pos);
            self.values.remove(pos);
        }
        true
    }
}
