//! Arena-backed B+Tree for ordered key access.

mod iter;
mod node;
mod tree;

pub use iter::RangeIter;
pub use node::{Node, NodeId};
pub use tree::{BTreeIndex, MIN_ORDER};
