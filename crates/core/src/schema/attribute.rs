//! Attribute definition.

use crate::error::Result;
use crate::types::DataType;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// One named, typed field of a schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    name: String,
    data_type: DataType,
    indexed: bool,
    /// Position within the schema (0-based).
    position: usize,
}

impl Attribute {
    /// Defines an attribute. Its position is assigned when it joins a schema.
    pub fn define(name: impl Into<String>, data_type: DataType, indexed: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            indexed,
            position: 0,
        }
    }

    pub(crate) fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Returns whether the attribute carries its own index.
    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Parses text into a value of this attribute's type.
    pub fn parse(&self, raw: &str) -> Result<Value> {
        Value::from_text(self.data_type, raw)
    }
}
