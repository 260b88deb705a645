//! B+Tree implementation.

use super::iter::RangeIter;
use super::node::{Node, NodeId};
use crate::config::IndexConfig;
use crate::range::KeyRange;
use sos_core::Handle;

/// Smallest order that keeps splits and merges well-formed.
pub const MIN_ORDER: usize = 4;

/// A B+Tree mapping each key to the values inserted under it.
///
/// Nodes live in an arena addressed by [`NodeId`]; nodes freed by merges are
/// recycled through a free list. Leaves are chained so ordered scans never
/// climb back up the tree.
#[derive(Debug)]
pub struct BTreeIndex<K, V = Handle> {
    arena: Vec<Node<K, V>>,
    free: Vec<NodeId>,
    root: NodeId,
    /// Maximum number of keys per node.
    order: usize,
    keys: usize,
    entries: usize,
}

impl<K: Clone + Ord, V: Copy + PartialEq> BTreeIndex<K, V> {
    /// Creates a tree with the given order, raised to [`MIN_ORDER`] if needed.
    pub fn new(order: usize) -> Self {
        Self {
            arena: vec![Node::new_leaf()],
            free: Vec::new(),
            root: 0,
            order: order.max(MIN_ORDER),
            keys: 0,
            entries: 0,
        }
    }

    pub fn with_config(config: &IndexConfig) -> Self {
        Self::new(config.btree_order)
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
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

    /// Nodes currently in use.
    pub fn node_count(&self) -> usize {
        self.arena.len() - self.free.len()
    }

    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut current = self.root;
        while !self.arena[current].is_leaf {
            current = self.arena[current].children[0];
            height += 1;
        }
        height
    }

    fn alloc_node(&mut self, node: Node<K, V>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.arena[id] = node;
                id
            }
            None => {
                self.arena.push(node);
                self.arena.len() - 1
            }
        }
    }

    fn release_node(&mut self, id: NodeId) {
        self.arena[id].reset();
        self.free.push(id);
    }

    /// Finds the leaf node that should contain the given key.
    fn find_leaf(&self, key: &K) -> NodeId {
        let mut current = self.root;
        loop {
            let node = &self.arena[current];
            if node.is_leaf {
                return current;
            }
            current = node.children[Self::find_child_position(node, key)];
        }
    }

    /// Child to descend into: the first separator greater than `key`.
    #[inline]
    fn find_child_position(node: &Node<K, V>, key: &K) -> usize {
        let pos = node.keys.partition_point(|k| k <= key);
        pos.min(node.children.len().saturating_sub(1))
    }

    /// Associates `value` with `key`.
    pub fn insert(&mut self, key: K, value: V) {
        let leaf_id = self.find_leaf(&key);
        let leaf = &mut self.arena[leaf_id];
        let pos = leaf.find_key_position(&key);
        if pos >= leaf.key_count() || leaf.keys[pos] != key {
            self.keys += 1;
        }
        leaf.insert_at(pos, key, value);
        self.entries += 1;

        if self.arena[leaf_id].key_count() >= self.order {
            self.split_leaf(leaf_id);
        }
    }

    fn split_leaf(&mut self, leaf_id: NodeId) {
        let mid = self.arena[leaf_id].key_count() / 2;

        let mut new_leaf = Node::new_leaf();
        new_leaf.keys = self.arena[leaf_id].keys.split_off(mid);
        new_leaf.values = self.arena[leaf_id].values.split_off(mid);
        new_leaf.next = self.arena[leaf_id].next;
        new_leaf.prev = Some(leaf_id);
        new_leaf.parent = self.arena[leaf_id].parent;
        let promote_key = new_leaf.keys[0].clone();

        let new_leaf_id = self.alloc_node(new_leaf);
        if let Some(next_id) = self.arena[leaf_id].next {
            self.arena[next_id].prev = Some(new_leaf_id);
        }
        self.arena[leaf_id].next = Some(new_leaf_id);

        self.insert_into_parent(leaf_id, promote_key, new_leaf_id);
    }

    fn insert_into_parent(&mut self, left_id: NodeId, key: K, right_id: NodeId) {
        match self.arena[left_id].parent {
            None => {
                let mut new_root = Node::new_internal();
                new_root.children.push(left_id);
                new_root.children.push(right_id);
                new_root.keys.push(key);

                let new_root_id = self.alloc_node(new_root);
                self.arena[left_id].parent = Some(new_root_id);
                self.arena[right_id].parent = Some(new_root_id);
                self.root = new_root_id;
            }
            Some(parent_id) => {
                let pos = Self::find_child_position(&self.arena[parent_id], &key);
                let parent = &mut self.arena[parent_id];
                parent.keys.insert(pos, key);
                parent.children.insert(pos + 1, right_id);
                self.arena[right_id].parent = Some(parent_id);

                if self.arena[parent_id].key_count() >= self.order {
                    self.split_internal(parent_id);
                }
            }
        }
    }

    fn split_internal(&mut self, node_id: NodeId) {
        let mid = self.arena[node_id].key_count() / 2;
        let promote_key = self.arena[node_id].keys[mid].clone();

        let mut new_node = Node::new_internal();
        new_node.keys = self.arena[node_id].keys.split_off(mid + 1);
        new_node.children = self.arena[node_id].children.split_off(mid + 1);
        new_node.parent = self.arena[node_id].parent;
        // Drop the promoted separator from the left half.
        self.arena[node_id].keys.pop();

        let new_node_id = self.alloc_node(new_node);
        for i in 0..self.arena[new_node_id].children.len() {
            let child_id = self.arena[new_node_id].children[i];
            self.arena[child_id].parent = Some(new_node_id);
        }

        self.insert_into_parent(node_id, promote_key, new_node_id);
    }

    /// Removes one association of `value` with `key`. Returns whether it
    /// existed.
    pub fn remove(&mut self, key: &K, value: &V) -> bool {
        let leaf_id = self.find_leaf(key);
        let Some(pos) = self.arena[leaf_id].find_key(key) else {
            return false;
        };
        let before = self.arena[leaf_id].key_count();
        if !self.arena[leaf_id].remove_at(pos, value) {
            return false;
        }
        self.entries -= 1;
        if self.arena[leaf_id].key_count() < before {
            self.keys -= 1;
        }
        if self.arena[leaf_id].is_empty() && leaf_id != self.root {
            self.handle_underflow(leaf_id);
        }
        true
    }

    fn handle_underflow(&mut self, node_id: NodeId) {
        let Some(parent_id) = self.arena[node_id].parent else {
            return;
        };
        let min_keys = (self.order - 1) / 2;
        if self.arena[node_id].key_count() >= min_keys {
            return;
        }
        let Some(pos) = self.arena[parent_id]
            .children
            .iter()
            .position(|&c| c == node_id)
        else {
            return;
        };
        let last = self.arena[parent_id].children.len() - 1;

        if pos > 0 {
            let left_id = self.arena[parent_id].children[pos - 1];
            if self.arena[left_id].key_count() > min_keys {
                self.borrow_from_left(node_id, left_id, parent_id, pos);
                return;
            }
        }
        if pos < last {
            let right_id = self.arena[parent_id].children[pos + 1];
            if self.arena[right_id].key_count() > min_keys {
                self.borrow_from_right(node_id, right_id, parent_id, pos);
                return;
            }
        }

        if pos > 0 {
            let left_id = self.arena[parent_id].children[pos - 1];
            self.merge_nodes(left_id, node_id, parent_id, pos - 1);
        } else if pos < last {
            let right_id = self.arena[parent_id].children[pos + 1];
            self.merge_nodes(node_id, right_id, parent_id, pos);
        }
    }

    fn borrow_from_left(&mut self, node_id: NodeId, left_id: NodeId, parent_id: NodeId, pos: usize) {
        if self.arena[node_id].is_leaf {
            let left = &mut self.arena[left_id];
            let (Some(key), Some(values)) = (left.keys.pop(), left.values.pop()) else {
                return;
            };
            self.arena[parent_id].keys[pos - 1] = key.clone();
            let node = &mut self.arena[node_id];
            node.keys.insert(0, key);
            node.values.insert(0, values);
        } else {
            let left = &mut self.arena[left_id];
            let (Some(left_key), Some(left_child)) = (left.keys.pop(), left.children.pop()) else {
                return;
            };
            let parent_key = std::mem::replace(&mut self.arena[parent_id].keys[pos - 1], left_key);
            let node = &mut self.arena[node_id];
            node.keys.insert(0, parent_key);
            node.children.insert(0, left_child);
            self.arena[left_child].parent = Some(node_id);
        }
    }

    fn borrow_from_right(&mut self, node_id: NodeId, right_id: NodeId, parent_id: NodeId, pos: usize) {
        if self.arena[node_id].is_leaf {
            let right = &mut self.arena[right_id];
            let key = right.keys.remove(0);
            let values = right.values.remove(0);
            let separator = right.keys[0].clone();
            self.arena[parent_id].keys[pos] = separator;
            let node = &mut self.arena[node_id];
            node.keys.push(key);
            node.values.push(values);
        } else {
            let right = &mut self.arena[right_id];
            let right_key = right.keys.remove(0);
            let right_child = right.children.remove(0);
            let parent_key = std::mem::replace(&mut self.arena[parent_id].keys[pos], right_key);
            let node = &mut self.arena[node_id];
            node.keys.push(parent_key);
            node.children.push(right_child);
            self.arena[right_child].parent = Some(node_id);
        }
    }

    /// Folds `right_id` into `left_id`, its left sibling under `parent_id`.
    fn merge_nodes(&mut self, left_id: NodeId, right_id: NodeId, parent_id: NodeId, pos: usize) {
        let right_keys = std::mem::take(&mut self.arena[right_id].keys);
        if self.arena[left_id].is_leaf {
            let right_values = std::mem::take(&mut self.arena[right_id].values);
            let right_next = self.arena[right_id].next;
            let left = &mut self.arena[left_id];
            left.keys.extend(right_keys);
            left.values.extend(right_values);
            left.next = right_next;
            if let Some(next_id) = right_next {
                self.arena[next_id].prev = Some(left_id);
            }
        } else {
            let separator = self.arena[parent_id].keys[pos].clone();
            let right_children = std::mem::take(&mut self.arena[right_id].children);
            for &child_id in &right_children {
                self.arena[child_id].parent = Some(left_id);
            }
            let left = &mut self.arena[left_id];
            left.keys.push(separator);
            left.keys.extend(right_keys);
            left.children.extend(right_children);
        }

        self.arena[parent_id].keys.remove(pos);
        self.arena[parent_id].children.remove(pos + 1);
        self.release_node(right_id);

        if parent_id == self.root && self.arena[parent_id].keys.is_empty() {
            self.root = left_id;
            self.arena[left_id].parent = None;
            self.release_node(parent_id);
        } else if parent_id != self.root {
            self.handle_underflow(parent_id);
        }
    }

    fn leftmost_leaf(&self) -> NodeId {
        let mut current = self.root;
        while !self.arena[current].is_leaf {
            current = self.arena[current].children[0];
        }
        current
    }

    fn rightmost_leaf(&self) -> NodeId {
        let mut current = self.root;
        while !self.arena[current].is_leaf {
            let children = &self.arena[current].children;
            current = children[children.len() - 1];
        }
        current
    }

    /// Every value stored under `key`, in insertion order.
    pub fn lookup(&self, key: &K) -> &[V] {
        let leaf = &self.arena[self.find_leaf(key)];
        match leaf.find_key(key) {
            Some(pos) => &leaf.values[pos],
            None => &[],
        }
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.arena[self.find_leaf(key)].find_key(key).is_some()
    }

    /// Smallest key and its values.
    pub fn min(&self) -> Option<(&K, &[V])> {
        let leaf = &self.arena[self.leftmost_leaf()];
        Some((leaf.keys.first()?, leaf.values.first()?.as_slice()))
    }

    /// Largest key and its values.
    pub fn max(&self) -> Option<(&K, &[V])> {
        let leaf = &self.arena[self.rightmost_leaf()];
        Some((leaf.keys.last()?, leaf.values.last()?.as_slice()))
    }

    /// Ascending scan of the keys in `range`, one item per stored value.
    pub fn range(&self, range: KeyRange<K>) -> RangeIter<'_, K, V> {
        let (node, pos) = match range.start() {
            None => (self.leftmost_leaf(), 0),
            Some(lower) => {
                let leaf = self.find_leaf(lower);
                (leaf, self.arena[leaf].find_key_position(lower))
            }
        };
        RangeIter::new(&self.arena, node, pos, range)
    }

    /// Ascending scan of every entry.
    pub fn iter(&self) -> RangeIter<'_, K, V> {
        self.range(KeyRange::all())
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.arena.push(Node::new_leaf());
        self.free.clear();
        self.root = 0;
        self.keys = 0;
        self.entries = 0;
    }
}
