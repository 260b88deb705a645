//! SOS Core - value model, keys and schemas for the SOS object store.
//!
//! This crate provides the foundational types:
//!
//! - `DataType`: attribute types (16/32/64-bit signed and unsigned integers,
//!   double, string, timestamp, arrays)
//! - `Value`: a tagged value of one of those types, with text parsing
//! - `Key` / `KeyType`: simple and composite (string, integer) index keys
//! - `pattern_match`: key patterns and key comparison
//! - `schema`: attributes, index definitions and schemas
//! - `Handle`: store-assigned object identifiers
//! - `Error`: the error taxonomy shared by every SOS crate
//!
//! # Example
//!
//! ```rust
//! use sos_core::schema::SchemaBuilder;
//! use sos_core::{DataType, Value};
//!
//! let schema = SchemaBuilder::new("job")
//!     .unwrap()
//!     .add_attribute("id", DataType::UInt32, true)
//!     .unwrap()
//!     .add_attribute("name", DataType::String, false)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.parse("id", "42").unwrap(), Value::UInt32(42));
//! assert!(schema.parse("id", "4294967296").is_err());
//! ```

mod error;
mod handle;
mod key;
pub mod parse;
pub mod pattern_match;
pub mod schema;
mod timestamp;
mod types;
mod value;

pub use error::{Error, Result};
pub use handle::Handle;
pub use key::{Key, KeyType};
pub use timestamp::Timestamp;
pub use types::{DataType, ElementType};
pub use value::{ArrayValue, Value};
