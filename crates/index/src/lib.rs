//! SOS Index - hash table and ordered indexes for the SOS object store.
//!
//! This crate provides:
//!
//! - [`H2Htbl`]: a dynamic chained hash table mapping a key to a bucket of
//!   values, with load-factor driven growth and key-ordered pattern walks
//! - [`BTreeIndex`]: an arena-backed B+Tree for ordered scans and min/max
//! - [`AttrIndex`]: the pair of both over one schema attribute, as used by
//!   the object store and the join engine
//!
//! # Example
//!
//! ```rust
//! use sos_core::{DataType, Handle, Key, KeyType, Value};
//! use sos_index::{AttrIndex, IndexConfig};
//!
//! let mut index = AttrIndex::new("id", KeyType::Simple(DataType::UInt32), &IndexConfig::default());
//! for (slot, id) in [5u32, 1, 3].into_iter().enumerate() {
//!     index.add(Key::Simple(Value::UInt32(id)), Handle::new(slot as u32, 0)).unwrap();
//! }
//!
//! assert_eq!(index.min().map(|(k, _)| k.clone()), Some(Key::Simple(Value::UInt32(1))));
//! assert_eq!(index.max().map(|(_, h)| h), Some(Handle::new(0, 0)));
//! ```

pub mod attr_index;
pub mod btree;
pub mod config;
pub mod htbl;
pub mod range;
pub mod stats;

pub use attr_index::AttrIndex;
pub use btree::{BTreeIndex, RangeIter};
pub use config::IndexConfig;
pub use htbl::{H2Htbl, PatternIter};
pub use range::KeyRange;
pub use stats::{IndexStats, TableStats};
