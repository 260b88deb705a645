//! Ascending B+Tree scans.

use super::node::{Node, NodeId};
use crate::range::KeyRange;

/// Walks the leaf chain from a start position, yielding one `(key, value)`
/// pair per stored value until the range's upper end is passed.
pub struct RangeIter<'a, K, V> {
    arena: &'a [Node<K, V>],
    current_node: Option<NodeId>,
    current_pos: usize,
    value_pos: usize,
    range: KeyRange<K>,
}

impl<'a, K: Ord, V: Copy> RangeIter<'a, K, V> {
    pub(crate) fn new(arena: &'a [Node<K, V>], node: NodeId, pos: usize, range: KeyRange<K>) -> Self {
        Self {
            arena,
            current_node: Some(node),
            current_pos: pos,
            value_pos: 0,
            range,
        }
    }

    /// Moves to the next key, following the leaf chain.
    fn advance_key(&mut self, node: &'a Node<K, V>) {
        self.value_pos = 0;
        self.current_pos += 1;
        if self.current_pos >= node.key_count() {
            self.current_node = node.next;
            self.current_pos = 0;
        }
    }
}

impl<'a, K: Ord, V: Copy> Iterator for RangeIter<'a, K, V> {
    type Item = (&'a K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.arena;
        loop {
            let node = &arena[self.current_node?];
            if self.current_pos >= node.key_count() {
                // Only an empty root leaf, or a start past the leaf's last key.
                self.current_node = node.next;
                self.current_pos = 0;
                continue;
            }

            let key = &node.keys[self.current_pos];
            if self.range.is_above(key) {
                self.current_node = None;
                return None;
            }
            if !self.range.contains(key) {
                self.advance_key(node);
                continue;
            }

            let values = &node.values[self.current_pos];
            if let Some(&value) = values.get(self.value_pos) {
                self.value_pos += 1;
                return Some((key, value));
            }
            self.advance_key(node);
        }
    }
}
