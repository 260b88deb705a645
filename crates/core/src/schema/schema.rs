//! Schema definition and builder.

use super::attribute::Attribute;
use super::index::{IndexDef, IndexKind};
use crate::error::{Error, Result};
use crate::key::{Key, KeyType};
use crate::types::DataType;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// An object type: ordered attributes and the indexes declared over them.
///
/// Schemas are immutable once built. Changing one means building a new
/// schema and a new store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    name: String,
    attributes: Vec<Attribute>,
    indexes: Vec<IndexDef>,
}

impl Schema {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    #[inline]
    pub fn indexes(&self) -> &[IndexDef] {
        &self.indexes
    }

    /// Number of attributes.
    #[inline]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Looks up an attribute by name.
    pub fn attribute(&self, name: &str) -> Result<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.name() == name)
            .ok_or_else(|| Error::unknown_attribute(&self.name, name))
    }

    /// Looks up an attribute position by name.
    pub fn position(&self, name: &str) -> Result<usize> {
        self.attribute(name).map(Attribute::position)
    }

    /// Looks up an index by name.
    pub fn index(&self, name: &str) -> Result<&IndexDef> {
        self.indexes
            .iter()
            .find(|i| i.name() == name)
            .ok_or_else(|| Error::index_not_found(&self.name, name))
    }

    /// Parses text for the named attribute.
    pub fn parse(&self, attribute: &str, raw: &str) -> Result<Value> {
        self.attribute(attribute)?.parse(raw)
    }

    /// Returns the key type of an index.
    pub fn key_type(&self, index: &IndexDef) -> KeyType {
        match index.kind() {
            IndexKind::Attribute(pos) => KeyType::Simple(self.attributes[pos].data_type()),
            IndexKind::Composite { number, .. } => {
                KeyType::Composite(self.attributes[number].data_type())
            }
        }
    }

    /// Builds the key of `index` from an object's attribute values.
    pub fn key_for(&self, index: &IndexDef, values: &[Value]) -> Key {
        match index.kind() {
            IndexKind::Attribute(pos) => Key::Simple(values[pos].clone()),
            IndexKind::Composite { text, number } => Key::Composite {
                text: values[text].as_str().unwrap_or_default().to_string(),
                number: values[number].clone(),
            },
        }
    }

    /// Checks the invariants a built schema holds: attribute positions match
    /// their order, names are valid and unique, and every index refers to
    /// attributes of the right shape.
    ///
    /// Schemas from [`SchemaBuilder`] always pass. Schemas decoded from
    /// elsewhere must be checked before keys are derived from them.
    pub fn validate(&self) -> Result<()> {
        SchemaBuilder::check_naming_rules(&self.name)?;
        if self.attributes.is_empty() {
            return Err(Error::invalid_schema(format!(
                "schema {} has no attributes",
                self.name
            )));
        }

        for (i, attr) in self.attributes.iter().enumerate() {
            SchemaBuilder::check_naming_rules(attr.name())?;
            if attr.position() != i {
                return Err(Error::invalid_schema(format!(
                    "attribute {} is at {} but claims position {}",
                    attr.name(),
                    i,
                    attr.position()
                )));
            }
            if self.attributes[..i].iter().any(|a| a.name() == attr.name()) {
                return Err(Error::invalid_schema(format!("duplicate name: {}", attr.name())));
            }
        }

        for (i, index) in self.indexes.iter().enumerate() {
            SchemaBuilder::check_naming_rules(index.name())?;
            if self.indexes[..i].iter().any(|d| d.name() == index.name()) {
                return Err(Error::invalid_schema(format!("duplicate index: {}", index.name())));
            }
            let attr = |pos: usize| {
                self.attributes.get(pos).ok_or_else(|| {
                    Error::invalid_schema(format!(
                        "index {} refers to position {} of {}",
                        index.name(),
                        pos,
                        self.attributes.len()
                    ))
                })
            };
            match index.kind() {
                IndexKind::Attribute(pos) => {
                    attr(pos)?;
                }
                IndexKind::Composite { text, number } => {
                    if attr(text)?.data_type() != DataType::String
                        || !attr(number)?.data_type().is_integer()
                    {
                        return Err(Error::invalid_schema(format!(
                            "composite index {} must pair a STRING with an integer",
                            index.name()
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Zero values for every attribute, in schema order.
    pub fn defaults(&self) -> Vec<Value> {
        self.attributes
            .iter()
            .map(|a| Value::default_for_type(a.data_type()))
            .collect()
    }
}

/// Builder for schemas.
pub struct SchemaBuilder {
    name: String,
    attributes: Vec<Attribute>,
    composites: Vec<(String, String, String)>,
}

impl SchemaBuilder {
    /// Creates a builder for a schema with the given name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        Ok(Self {
            name,
            attributes: Vec::new(),
            composites: Vec::new(),
        })
    }

    fn check_naming_rules(name: &str) -> Result<()> {
        let mut chars = name.chars();
        let first = match chars.next() {
            Some(c) => c,
            None => return Err(Error::invalid_schema("name cannot be empty")),
        };
        if !first.is_ascii_alphabetic() && first != '_' {
            return Err(Error::invalid_schema(format!(
                "name must start with a letter or underscore: {}",
                name
            )));
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::invalid_schema(format!(
                "name contains invalid characters: {}",
                name
            )));
        }
        Ok(())
    }

    fn name_taken(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name() == name)
            || self.composites.iter().any(|(n, _, _)| n == name)
    }

    /// Adds an attribute definition.
    pub fn attribute(mut self, attribute: Attribute) -> Result<Self> {
        Self::check_naming_rules(attribute.name())?;
        if self.name_taken(attribute.name()) {
            return Err(Error::invalid_schema(format!(
                "duplicate name: {}",
                attribute.name()
            )));
        }
        let position = self.attributes.len();
        self.attributes.push(attribute.with_position(position));
        Ok(self)
    }

    /// Adds an attribute by name and type.
    pub fn add_attribute(
        self,
        name: impl Into<String>,
        data_type: DataType,
        indexed: bool,
    ) -> Result<Self> {
        self.attribute(Attribute::define(name, data_type, indexed))
    }

    /// Adds an attribute whose type is given by name, e.g. `"UINT32"`.
    pub fn add_attribute_named(
        self,
        name: impl Into<String>,
        type_name: &str,
        indexed: bool,
    ) -> Result<Self> {
        let data_type = type_name.parse::<DataType>()?;
        self.add_attribute(name, data_type, indexed)
    }

    /// Declares a composite index over a string attribute and an integer
    /// attribute. Both must already be defined.
    pub fn add_composite_index(
        mut self,
        name: impl Into<String>,
        text_attribute: &str,
        number_attribute: &str,
    ) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        if self.name_taken(&name) {
            return Err(Error::invalid_schema(format!("duplicate name: {}", name)));
        }
        self.composites
            .push((name, text_attribute.to_string(), number_attribute.to_string()));
        Ok(self)
    }

    /// Builds the schema.
    pub fn build(self) -> Result<Schema> {
        if self.attributes.is_empty() {
            return Err(Error::invalid_schema(format!(
                "schema {} has no attributes",
                self.name
            )));
        }

        let mut indexes: Vec<IndexDef> = self
            .attributes
            .iter()
            .filter(|a| a.is_indexed())
            .map(|a| IndexDef::new(a.name(), IndexKind::Attribute(a.position())))
            .collect();

        for (name, text_name, number_name) in &self.composites {
            let find = |attr: &str| {
                self.attributes
                    .iter()
                    .find(|a| a.name() == attr)
                    .ok_or_else(|| Error::unknown_attribute(&self.name, attr))
            };
            let text = find(text_name)?;
            let number = find(number_name)?;
            if text.data_type() != DataType::String {
                return Err(Error::invalid_schema(format!(
                    "composite index {}: {} must be STRING, is {}",
                    name,
                    text.name(),
                    text.data_type()
                )));
            }
            if !number.data_type().is_integer() {
                return Err(Error::invalid_schema(format!(
                    "composite index {}: {} must be an integer, is {}",
                    name,
                    number.name(),
                    number.data_type()
                )));
            }
            indexes.push(IndexDef::new(
                name.clone(),
                IndexKind::Composite {
                    text: text.position(),
                    number: number.position(),
                },
            ));
        }

        Ok(Schema {
            name: self.name,
            attributes: self.attributes,
            indexes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_schema() -> Schema {
        SchemaBuilder::new("job")
            .unwrap()
            .add_attribute("id", DataType::UInt32, true)
            .unwrap()
            .add_attribute("name", DataType::String, false)
            .unwrap()
            .add_attribute_named("ts", "TIMESTAMP", false)
            .unwrap()
            .add_composite_index("name_id", "name", "id")
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_schema_layout() {
        let schema = job_schema();
        assert_eq!(schema.name(), "job");
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.position("ts").unwrap(), 2);
        assert_eq!(schema.attribute("name").unwrap().data_type(), DataType::String);
        assert_eq!(schema.indexes().len(), 2);
        assert_eq!(schema.indexes()[0].name(), "id");
    }

    #[test]
    fn test_unknown_attribute() {
        let schema = job_schema();
        assert!(matches!(
            schema.attribute("nope"),
            Err(Error::UnknownAttribute { .. })
        ));
        assert!(matches!(schema.index("ts"), Err(Error::IndexNotFound { .. })));
    }

    #[test]
    fn test_key_types() {
        let schema = job_schema();
        let id = schema.index("id").unwrap();
        let name_id = schema.index("name_id").unwrap();
        assert_eq!(schema.key_type(id), KeyType::Simple(DataType::UInt32));
        assert_eq!(schema.key_type(name_id), KeyType::Composite(DataType::UInt32));

        let values = vec![Value::UInt32(4), Value::from("a"), Value::default_for_type(DataType::Timestamp)];
        assert_eq!(schema.key_for(id, &values), Key::Simple(Value::UInt32(4)));
        assert_eq!(
            schema.key_for(name_id, &values),
            Key::composite("a", Value::UInt32(4)).unwrap()
        );
    }

    #[test]
    fn test_duplicate_and_invalid_names() {
        let b = SchemaBuilder::new("s")
            .unwrap()
            .add_attribute("a", DataType::Int16, false)
            .unwrap();
        assert!(b.add_attribute("a", DataType::Int32, false).is_err());
        assert!(SchemaBuilder::new("9lives").is_err());
        assert!(SchemaBuilder::new("").is_err());
        assert!(SchemaBuilder::new("ok")
            .unwrap()
            .add_attribute("bad-name", DataType::Int16, false)
            .is_err());
        assert!(SchemaBuilder::new("empty").unwrap().build().is_err());
    }

    #[test]
    fn test_composite_shape_checked() {
        let err = SchemaBuilder::new("s")
            .unwrap()
            .add_attribute("a", DataType::UInt32, false)
            .unwrap()
            .add_attribute("b", DataType::UInt32, false)
            .unwrap()
            .add_composite_index("ab", "a", "b")
            .unwrap()
            .build();
        assert!(matches!(err, Err(Error::InvalidSchema { .. })));

        let err = SchemaBuilder::new("s")
            .unwrap()
            .add_attribute("a", DataType::String, false)
            .unwrap()
            .add_composite_index("ab", "a", "missing")
            .unwrap()
            .build();
        assert!(matches!(err, Err(Error::UnknownAttribute { .. })));
    }

    #[test]
    fn test_validate_rejects_inconsistent_layout() {
        let good = job_schema();
        assert!(good.validate().is_ok());

        let mut out_of_range = good.clone();
        out_of_range.indexes[0] = IndexDef::new("id", IndexKind::Attribute(5));
        assert!(matches!(out_of_range.validate(), Err(Error::InvalidSchema { .. })));

        let mut shifted = good.clone();
        shifted.attributes[1] = shifted.attributes[1].clone().with_position(0);
        assert!(shifted.validate().is_err());

        let mut renamed = good.clone();
        renamed.attributes[2] = Attribute::define("id", DataType::Timestamp, false).with_position(2);
        assert!(renamed.validate().is_err());

        let mut twice = good.clone();
        twice.indexes.push(good.indexes[0].clone());
        assert!(twice.validate().is_err());

        // name_id with its parts swapped: the text part is an integer.
        let mut swapped = good.clone();
        swapped.indexes[1] = IndexDef::new("name_id", IndexKind::Composite { text: 0, number: 1 });
        assert!(swapped.validate().is_err());

        let mut empty = good;
        empty.attributes.clear();
        empty.indexes.clear();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_parse_and_defaults() {
        let schema = job_schema();
        assert_eq!(schema.parse("id", "7").unwrap(), Value::UInt32(7));
        assert!(matches!(schema.parse("id", "-7"), Err(Error::Range { .. })));
        assert_eq!(schema.defaults()[0], Value::UInt32(0));
        assert_eq!(schema.defaults()[1], Value::from(""));
    }
}
