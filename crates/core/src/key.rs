//! Index keys.
//!
//! A key is either a single value or a composite of a string component and
//! an integer component. Composite keys order by the string first and use the
//! integer as the tie-break.

use crate::error::{Error, Result};
use crate::types::DataType;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// The shape and component types of a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// A single value of the given type.
    Simple(DataType),
    /// A string component followed by an integer component of the given type.
    Composite(DataType),
}

impl KeyType {
    /// Parses key text. Composite keys are written `<text>:<integer>`, split
    /// at the last colon so the text part may itself contain colons.
    pub fn parse(&self, raw: &str) -> Result<Key> {
        match self {
            KeyType::Simple(dt) => Value::from_text(*dt, raw).map(Key::Simple),
            KeyType::Composite(dt) => {
                let (text, number) = raw.rsplit_once(':').ok_or_else(|| {
                    Error::parse(*dt, raw, "composite key must be <text>:<integer>")
                })?;
                Key::composite(text, Value::from_text(*dt, number)?)
            }
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyType::Simple(dt) => write!(f, "{}", dt),
            KeyType::Composite(dt) => write!(f, "STRING+{}", dt),
        }
    }
}

/// A key addressing entries of a hash table or index.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    Simple(Value),
    Composite { text: String, number: Value },
}

impl Key {
    /// Creates a composite key; `number` must be an integer value.
    pub fn composite(text: impl Into<String>, number: Value) -> Result<Self> {
        if !number.is_integer() {
            return Err(Error::type_mismatch("integer", number.data_type()));
        }
        Ok(Key::Composite {
            text: text.into(),
            number,
        })
    }

    /// Returns the key type.
    pub fn key_type(&self) -> KeyType {
        match self {
            Key::Simple(v) => KeyType::Simple(v.data_type()),
            Key::Composite { number, .. } => KeyType::Composite(number.data_type()),
        }
    }

    /// Checked three-way comparison; keys of different types are an error.
    pub fn compare(&self, other: &Key) -> Result<Ordering> {
        let (a, b) = (self.key_type(), other.key_type());
        if a != b {
            return Err(Error::type_mismatch(a, b));
        }
        Ok(self.cmp(other))
    }

    /// Returns the string component: the whole value for a simple string
    /// key, the text part of a composite key.
    pub fn text(&self) -> Option<&str> {
        match self {
            Key::Simple(v) => v.as_str(),
            Key::Composite { text, .. } => Some(text.as_str()),
        }
    }

    /// Returns the simple value, if this is a simple key.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Key::Simple(v) => Some(v),
            Key::Composite { .. } => None,
        }
    }
}

impl From<Value> for Key {
    fn from(v: Value) -> Self {
        Key::Simple(v)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Simple(v) => write!(f, "{}", v),
            Key::Composite { text, number } => write!(f, "{}:{}", text, number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ck(text: &str, n: u32) -> Key {
        Key::composite(text, Value::UInt32(n)).unwrap()
    }

    #[test]
    fn test_composite_ordering() {
        assert!(ck("a", 9) < ck("b", 0));
        assert!(ck("a", 1) < ck("a", 2));
        assert_eq!(ck("a", 1).compare(&ck("a", 1)).unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_composite_requires_integer() {
        assert!(Key::composite("a", Value::from("b")).is_err());
        assert!(Key::composite("a", Value::Float64(1.0)).is_err());
        assert!(Key::composite("a", Value::Int16(-1)).is_ok());
    }

    #[test]
    fn test_compare_across_key_types() {
        let simple = Key::Simple(Value::UInt32(1));
        assert!(simple.compare(&ck("a", 1)).is_err());
        assert!(simple.compare(&Key::Simple(Value::UInt16(1))).is_err());
        assert!(ck("a", 1)
            .compare(&Key::composite("a", Value::UInt64(1)).unwrap())
            .is_err());
    }

    #[test]
    fn test_key_type_display_and_parse() {
        let kt = KeyType::Composite(DataType::UInt32);
        assert_eq!(kt.to_string(), "STRING+UINT32");
        assert_eq!(kt.parse("host:a:42").unwrap(), ck("host:a", 42));
        assert!(kt.parse("no-number").is_err());

        let simple = KeyType::Simple(DataType::Int16);
        assert_eq!(simple.parse("-5").unwrap(), Key::Simple(Value::Int16(-5)));
        assert_eq!(ck("x", 3).to_string(), "x:3");
    }

    #[test]
    fn test_text_component() {
        assert_eq!(Key::Simple(Value::from("abc")).text(), Some("abc"));
        assert_eq!(ck("abc", 1).text(), Some("abc"));
        assert_eq!(Key::Simple(Value::UInt16(1)).text(), None);
    }
}
