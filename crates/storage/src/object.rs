//! Objects and borrowed object views.

use serde::{Deserialize, Serialize};
use sos_core::schema::Schema;
use sos_core::{Handle, Result, Value};

/// The stored form of an object: one value per schema attribute, in schema
/// order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Object {
    values: Vec<Value>,
}

impl Object {
    pub(crate) fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [Value] {
        &mut self.values
    }
}

/// A read-only view of a live object.
#[derive(Clone, Copy, Debug)]
pub struct ObjectRef<'a> {
    handle: Handle,
    schema: &'a Schema,
    object: &'a Object,
}

impl<'a> ObjectRef<'a> {
    pub(crate) fn new(handle: Handle, schema: &'a Schema, object: &'a Object) -> Self {
        Self {
            handle,
            schema,
            object,
        }
    }

    #[inline]
    pub fn handle(&self) -> Handle {
        self.handle
    }

    #[inline]
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Value of the named attribute.
    pub fn get(&self, attribute: &str) -> Result<&'a Value> {
        let pos = self.schema.position(attribute)?;
        Ok(&self.object.values[pos])
    }

    /// Value at an attribute position.
    pub fn value_at(&self, pos: usize) -> Option<&'a Value> {
        self.object.values.get(pos)
    }

    #[inline]
    pub fn values(&self) -> &'a [Value] {
        &self.object.values
    }

    /// Copies the values out of the store.
    pub fn to_object(&self) -> Object {
        self.object.clone()
    }
}

impl PartialEq for ObjectRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle && self.object == other.object
    }
}
