//! Data type definitions for SOS.
//!
//! Every attribute of a schema carries one of these tags. A value's tag never
//! changes after it is created.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Element types an array attribute may hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementType {
    Int16,
    Int32,
    Int64,
    UInt16,
    UInt32,
    UInt64,
    Float64,
}

impl ElementType {
    /// Returns the scalar data type of a single element.
    pub fn data_type(self) -> DataType {
        match self {
            ElementType::Int16 => DataType::Int16,
            ElementType::Int32 => DataType::Int32,
            ElementType::Int64 => DataType::Int64,
            ElementType::UInt16 => DataType::UInt16,
            ElementType::UInt32 => DataType::UInt32,
            ElementType::UInt64 => DataType::UInt64,
            ElementType::Float64 => DataType::Float64,
        }
    }

    /// Returns the element type for a scalar data type, if arrays of it are allowed.
    pub fn from_data_type(dt: DataType) -> Option<Self> {
        match dt {
            DataType::Int16 => Some(ElementType::Int16),
            DataType::Int32 => Some(ElementType::Int32),
            DataType::Int64 => Some(ElementType::Int64),
            DataType::UInt16 => Some(ElementType::UInt16),
            DataType::UInt32 => Some(ElementType::UInt32),
            DataType::UInt64 => Some(ElementType::UInt64),
            DataType::Float64 => Some(ElementType::Float64),
            _ => None,
        }
    }
}

/// Supported attribute types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DataType {
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 16-bit unsigned integer
    UInt16,
    /// 32-bit unsigned integer
    UInt32,
    /// 64-bit unsigned integer
    UInt64,
    /// 64-bit IEEE floating point
    Float64,
    /// Variable-length byte string (UTF-8)
    String,
    /// Wall-clock instant, seconds plus microseconds
    Timestamp,
    /// Ordered sequence of one element type
    Array(ElementType),
}

impl DataType {
    /// Returns the canonical upper-case type name, e.g. `"UINT32"`.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int16 => "INT16",
            DataType::Int32 => "INT32",
            DataType::Int64 => "INT64",
            DataType::UInt16 => "UINT16",
            DataType::UInt32 => "UINT32",
            DataType::UInt64 => "UINT64",
            DataType::Float64 => "DOUBLE",
            DataType::String => "STRING",
            DataType::Timestamp => "TIMESTAMP",
            DataType::Array(ElementType::Int16) => "INT16_ARRAY",
            DataType::Array(ElementType::Int32) => "INT32_ARRAY",
            DataType::Array(ElementType::Int64) => "INT64_ARRAY",
            DataType::Array(ElementType::UInt16) => "UINT16_ARRAY",
            DataType::Array(ElementType::UInt32) => "UINT32_ARRAY",
            DataType::Array(ElementType::UInt64) => "UINT64_ARRAY",
            DataType::Array(ElementType::Float64) => "DOUBLE_ARRAY",
        }
    }

    /// Binary size of one value, or `None` for variable-length types.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            DataType::Int16 | DataType::UInt16 => Some(2),
            DataType::Int32 | DataType::UInt32 => Some(4),
            DataType::Int64 | DataType::UInt64 | DataType::Float64 | DataType::Timestamp => {
                Some(8)
            }
            DataType::String | DataType::Array(_) => None,
        }
    }

    /// Upper bound on the rendered text of a fixed-size value.
    pub fn max_text_len(&self) -> Option<usize> {
        match self {
            DataType::Int16 => Some(6),
            DataType::UInt16 => Some(5),
            DataType::Int32 => Some(11),
            DataType::UInt32 => Some(10),
            DataType::Int64 => Some(20),
            DataType::UInt64 => Some(20),
            DataType::Float64 => Some(32),
            DataType::Timestamp => Some(27),
            DataType::String | DataType::Array(_) => None,
        }
    }

    /// Returns true for the six integer widths.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        )
    }

    /// Returns true for unsigned integer widths.
    pub fn is_unsigned(&self) -> bool {
        matches!(self, DataType::UInt16 | DataType::UInt32 | DataType::UInt64)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        let dt = match upper.as_str() {
            "INT16" => DataType::Int16,
            "INT32" => DataType::Int32,
            "INT64" => DataType::Int64,
            "UINT16" => DataType::UInt16,
            "UINT32" => DataType::UInt32,
            "UINT64" => DataType::UInt64,
            "DOUBLE" | "FLOAT64" => DataType::Float64,
            "STRING" => DataType::String,
            "TIMESTAMP" => DataType::Timestamp,
            "INT16_ARRAY" => DataType::Array(ElementType::Int16),
            "INT32_ARRAY" => DataType::Array(ElementType::Int32),
            "INT64_ARRAY" => DataType::Array(ElementType::Int64),
            "UINT16_ARRAY" => DataType::Array(ElementType::UInt16),
            "UINT32_ARRAY" => DataType::Array(ElementType::UInt32),
            "UINT64_ARRAY" => DataType::Array(ElementType::UInt64),
            "DOUBLE_ARRAY" | "FLOAT64_ARRAY" => DataType::Array(ElementType::Float64),
            _ => return Err(Error::invalid_schema(format!("unknown type name: {}", s))),
        };
        Ok(dt)
    }
}
