//! SOS Query - join engine for the SOS object store.
//!
//! [`join`] correlates two [`AttrIndex`](sos_index::AttrIndex)es, possibly
//! from stores of different schemas, yielding every pair of handles whose
//! keys are equal. It works for every simple key type and for composite
//! (string, integer) keys alike; only the key hashing and equality differ.
//! [`join_objects`] does the same for named indexes of two stores and
//! resolves each pair to its objects.
//!
//! # Example
//!
//! ```rust
//! use sos_core::schema::SchemaBuilder;
//! use sos_core::{DataType, Value};
//! use sos_storage::ObjectStore;
//!
//! let schema = |name: &str| {
//!     SchemaBuilder::new(name)
//!         .unwrap()
//!         .add_attribute("key", DataType::UInt32, true)
//!         .unwrap()
//!         .add_attribute("label", DataType::String, false)
//!         .unwrap()
//!         .build()
//!         .unwrap()
//! };
//! let mut a = ObjectStore::new(schema("a"));
//! let mut b = ObjectStore::new(schema("b"));
//! for (key, label) in [(1u32, "x"), (2, "y")] {
//!     a.insert(vec![Value::UInt32(key), Value::String(label.into())]).unwrap();
//! }
//! for (key, label) in [(1u32, "p"), (1, "q"), (3, "r")] {
//!     b.insert(vec![Value::UInt32(key), Value::String(label.into())]).unwrap();
//! }
//!
//! let mut labels: Vec<String> = sos_query::join_objects(&a, "key", &b, "key")
//!     .unwrap()
//!     .map(|(x, y)| format!("{}{}", x.get("label").unwrap(), y.get("label").unwrap()))
//!     .collect();
//! labels.sort();
//! assert_eq!(labels, ["xp", "xq"]);
//! ```

pub mod join;

pub use join::{join, join_objects, HashJoin};
