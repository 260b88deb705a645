//! SOS Storage - object stores for the SOS object store.
//!
//! This crate provides:
//!
//! - [`ObjectStore`]: the objects of one schema with their indexes kept in
//!   step, typed get/set, predicate and condition filters, delete, and
//!   snapshot persistence to a directory
//! - [`HandleArena`]: generational slot storage behind object handles
//! - [`Filter`]: ordered, condition-constrained iteration over one index
//! - [`SharedStore`]: scoped reader/writer access for multi-threaded use
//!
//! # Example
//!
//! ```rust
//! use sos_core::schema::SchemaBuilder;
//! use sos_core::{DataType, Value};
//! use sos_storage::ObjectStore;
//!
//! let schema = SchemaBuilder::new("job")
//!     .unwrap()
//!     .add_attribute("id", DataType::UInt32, true)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! let mut store = ObjectStore::new(schema);
//!
//! for id in [5u32, 1, 3] {
//!     let h = store.create_object().unwrap();
//!     store.set(h, "id", Value::UInt32(id)).unwrap();
//! }
//!
//! let min = store.min("id").unwrap().unwrap();
//! assert_eq!(min.get("id").unwrap(), &Value::UInt32(1));
//!
//! let handle = min.handle();
//! store.delete(handle).unwrap();
//! let min = store.min("id").unwrap().unwrap();
//! assert_eq!(min.get("id").unwrap(), &Value::UInt32(3));
//! ```

pub mod arena;
pub mod config;
pub mod filter;
pub mod object;
pub mod object_store;
mod persist;
pub mod shared;

pub use arena::HandleArena;
pub use config::{StoreConfig, DEFAULT_SNAPSHOT_FILE};
pub use filter::{CmpOp, Filter};
pub use object::{Object, ObjectRef};
pub use object_store::ObjectStore;
pub use shared::SharedStore;
