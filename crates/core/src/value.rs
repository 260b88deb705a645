//! Value type definitions for SOS.
//!
//! `Value` is a closed tagged union. Equality, ordering and hashing dispatch
//! on the tag; values of different tags are never coerced into each other.
//! [`Value::compare`] is the checked comparison used by queries and reports
//! a cross-tag comparison as an error. The `Ord` impl is total so values can
//! live in ordered containers, falling back to tag order across tags.

use crate::error::{Error, Result};
use crate::timestamp::Timestamp;
use crate::types::{DataType, ElementType};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// An ordered sequence of values that all share one element type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArrayValue {
    element: ElementType,
    items: Vec<Value>,
}

impl ArrayValue {
    /// Creates an array, checking every item against the element type.
    pub fn new(element: ElementType, items: Vec<Value>) -> Result<Self> {
        let expected = element.data_type();
        if let Some(bad) = items.iter().find(|v| v.data_type() != expected) {
            return Err(Error::type_mismatch(expected, bad.data_type()));
        }
        Ok(Self { element, items })
    }

    /// Creates an empty array.
    pub fn empty(element: ElementType) -> Self {
        Self {
            element,
            items: Vec::new(),
        }
    }

    /// Returns the element type.
    #[inline]
    pub fn element(&self) -> ElementType {
        self.element
    }

    /// Returns the items.
    #[inline]
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Returns the number of items.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the array holds no items.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the item at `pos`.
    pub fn get(&self, pos: usize) -> Option<&Value> {
        self.items.get(pos)
    }
}

/// A value stored in an object attribute.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Value {
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float64(f64),
    String(String),
    Timestamp(Timestamp),
    Array(ArrayValue),
}

impl Value {
    /// Returns the data type of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int16(_) => DataType::Int16,
            Value::Int32(_) => DataType::Int32,
            Value::Int64(_) => DataType::Int64,
            Value::UInt16(_) => DataType::UInt16,
            Value::UInt32(_) => DataType::UInt32,
            Value::UInt64(_) => DataType::UInt64,
            Value::Float64(_) => DataType::Float64,
            Value::String(_) => DataType::String,
            Value::Timestamp(_) => DataType::Timestamp,
            Value::Array(a) => DataType::Array(a.element()),
        }
    }

    /// Creates the zero value for the given data type.
    pub fn default_for_type(dt: DataType) -> Self {
        match dt {
            DataType::Int16 => Value::Int16(0),
            DataType::Int32 => Value::Int32(0),
            DataType::Int64 => Value::Int64(0),
            DataType::UInt16 => Value::UInt16(0),
            DataType::UInt32 => Value::UInt32(0),
            DataType::UInt64 => Value::UInt64(0),
            DataType::Float64 => Value::Float64(0.0),
            DataType::String => Value::String(String::new()),
            DataType::Timestamp => Value::Timestamp(Timestamp::default()),
            DataType::Array(element) => Value::Array(ArrayValue::empty(element)),
        }
    }

    /// Compares two values of the same tag.
    ///
    /// Values of different tags are not comparable and yield `TypeMismatch`.
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        let (a, b) = (self.data_type(), other.data_type());
        if a != b {
            return Err(Error::type_mismatch(a, b));
        }
        Ok(self.cmp(other))
    }

    /// Returns true if this is one of the integer variants.
    #[inline]
    pub fn is_integer(&self) -> bool {
        self.data_type().is_integer()
    }

    /// Returns any signed integer widened to i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int16(v) => Some(i64::from(*v)),
            Value::Int32(v) => Some(i64::from(*v)),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns any unsigned integer widened to u64.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt16(v) => Some(u64::from(*v)),
            Value::UInt32(v) => Some(u64::from(*v)),
            Value::UInt64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the f64 value if this is a Float64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a String.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Returns the timestamp if this is a Timestamp.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the array if this is an Array.
    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Parses text into a value of the given type.
    pub fn from_text(dt: DataType, raw: &str) -> Result<Self> {
        crate::parse::parse_value(dt, raw)
    }

    /// Renders the value in the textual form accepted by [`Value::from_text`].
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    fn type_order(&self) -> u8 {
        match self {
            Value::Int16(_) => 0,
            Value::Int32(_) => 1,
            Value::Int64(_) => 2,
            Value::UInt16(_) => 3,
            Value::UInt32(_) => 4,
            Value::UInt64(_) => 5,
            Value::Float64(_) => 6,
            Value::String(_) => 7,
            Value::Timestamp(_) => 8,
            Value::Array(_) => 9,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Int16(a), Value::Int16(b)) => a.cmp(b),
            (Value::Int32(a), Value::Int32(b)) => a.cmp(b),
            (Value::Int64(a), Value::Int64(b)) => a.cmp(b),
            (Value::UInt16(a), Value::UInt16(b)) => a.cmp(b),
            (Value::UInt32(a), Value::UInt32(b)) => a.cmp(b),
            (Value::UInt64(a), Value::UInt64(b)) => a.cmp(b),
            (Value::Float64(a), Value::Float64(b)) => a.total_cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => a.cmp(b),
            _ => self.type_order().cmp(&other.type_order()),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Value::Int16(v) => v.hash(state),
            Value::Int32(v) => v.hash(state),
            Value::Int64(v) => v.hash(state),
            Value::UInt16(v) => v.hash(state),
            Value::UInt32(v) => v.hash(state),
            Value::UInt64(v) => v.hash(state),
            Value::Float64(v) => v.to_bits().hash(state),
            Value::String(v) => v.hash(state),
            Value::Timestamp(v) => v.hash(state),
            Value::Array(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::UInt16(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::UInt64(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::String(v) => f.write_str(v),
            Value::Timestamp(v) => write!(f, "{}", v),
            Value::Array(a) => {
                for (i, item) in a.items().iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f64 => Float64,
    String => String,
    Timestamp => Timestamp,
    ArrayValue => Array,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}
