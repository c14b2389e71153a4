//! Input schema as produced by the extraction service.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::SchemaError;

/// Record fields are lenient: a missing or `null` field reads as its default,
/// and records left without an owner or endpoint are dropped during layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    pub entities: Vec<Entity>,
    pub attributes: Vec<Attribute>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relationships: Vec<Relationship>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cardinalities: Vec<Cardinality>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_weak: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(default, deserialize_with = "null_as_default")]
    pub entity: String,
    #[serde(default)]
    pub attribute: AttributeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<String>>,
}

/// An attribute name as it appears on the wire: usually a plain string, but
/// the extraction service sometimes nests a record in its place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeName {
    Text(String),
    Record(Map<String, Value>),
    Other(Value),
}

impl Default for AttributeName {
    fn default() -> Self {
        Self::Record(Map::new())
    }
}

impl From<&str> for AttributeName {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    #[serde(default, deserialize_with = "null_as_default")]
    pub from: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub to: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_identifying: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: Vec<AttributeName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cardinality {
    #[serde(default, deserialize_with = "null_as_default")]
    pub from: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub to: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
}

impl Schema {
    /// Parse schema JSON, rejecting input whose `entities` or `attributes`
    /// are missing or not arrays.
    pub fn from_json(input: &str) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        for field in ["entities", "attributes"] {
            if !value.get(field).is_some_and(Value::is_array) {
                return Err(SchemaError::Malformed { field });
            }
        }
        Ok(serde_json::from_value(value)?)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
