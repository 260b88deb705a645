//! Schema module for SOS.
//!
//! A schema is an ordered, immutable set of named typed attributes plus the
//! indexes declared over them.

mod attribute;
mod index;
mod schema;

pub use attribute::Attribute;
pub use index::{IndexDef, IndexKind};
pub use schema::{Schema, SchemaBuilder};
