//! Normalized intermediate representation consumed by the layout engine.
//!
//! Raw attribute records are canonicalized to strings, duplicate attributes
//! are dropped per owning entity, and the `PK_`/`MV_`/`DA_` name prefixes are
//! decoded here once so that nothing downstream inspects name strings.

use std::collections::HashSet;

use log::debug;
use serde_json::Value;

use crate::schema::{Attribute, AttributeName, Cardinality, Schema};

/// Semantic role carried by an attribute name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeRole {
    #[default]
    Plain,
    PrimaryKey,
    MultiValued,
    Derived,
}

impl AttributeRole {
    const PREFIXES: [(&'static str, AttributeRole); 3] = [
        ("PK_", AttributeRole::PrimaryKey),
        ("MV_", AttributeRole::MultiValued),
        ("DA_", AttributeRole::Derived),
    ];

    /// Split a normalized attribute name into its role and display label.
    pub fn decode(name: &str) -> (Self, &str) {
        Self::PREFIXES
            .iter()
            .find_map(|(prefix, role)| name.strip_prefix(*prefix).map(|rest| (*role, rest)))
            .unwrap_or((Self::Plain, name))
    }
}

/// Canonical string form of a raw attribute name.
///
/// Strings pass through; records prefer a non-empty `attribute` field, then
/// `name`, and otherwise fall back to their JSON serialization (keys sorted,
/// so the result is stable).
pub fn normalize_attribute(raw: &AttributeName) -> String {
    match raw {
        AttributeName::Text(s) => s.clone(),
        AttributeName::Record(map) => ["attribute", "name"]
            .iter()
            .find_map(|key| match map.get(*key) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                _ => None,
            })
            .unwrap_or_else(|| Value::Object(map.clone()).to_string()),
        AttributeName::Other(value) => value.to_string(),
    }
}

/// Keep the first attribute for each `(entity, normalized name)` pair.
pub fn dedup_attributes(attributes: &[Attribute]) -> Vec<&Attribute> {
    let mut seen: HashSet<(&str, String)> = HashSet::new();
    attributes
        .iter()
        .filter(|a| seen.insert((a.entity.as_str(), normalize_attribute(&a.attribute))))
        .collect()
}

#[derive(Debug, Clone)]
pub struct ErGraph {
    pub entities: Vec<EntityIR>,
    /// Deduplicated, in schema order.
    pub attributes: Vec<AttributeIR>,
    /// Every relationship in schema order, including ones with dangling ends.
    pub relationships: Vec<RelationshipIR>,
    pub cardinalities: Vec<Cardinality>,
}

#[derive(Debug, Clone)]
pub struct EntityIR {
    pub name: String,
    pub is_weak: bool,
}

#[derive(Debug, Clone)]
pub struct AttributeIR {
    pub entity: String,
    /// Normalized name including any prefix; used for ids.
    pub key: String,
    pub label: String,
    pub role: AttributeRole,
    pub components: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct RelationshipIR {
    pub from: String,
    pub to: String,
    pub label: String,
    pub is_identifying: bool,
    pub attributes: Vec<RelAttributeIR>,
}

#[derive(Debug, Clone)]
pub struct RelAttributeIR {
    pub key: String,
    pub label: String,
    pub role: AttributeRole,
}

impl ErGraph {
    pub fn from_schema(schema: &Schema) -> Self {
        let entities = schema
            .entities
            .iter()
            .filter(|e| {
                if e.name.is_empty() {
                    debug!("Skipping entity without a name");
                }
                !e.name.is_empty()
            })
            .map(|e| EntityIR {
                name: e.name.clone(),
                is_weak: e.is_weak,
            })
            .collect();

        let attributes = dedup_attributes(&schema.attributes)
            .into_iter()
            .map(|a| {
                let key = normalize_attribute(&a.attribute);
                let (role, label) = AttributeRole::decode(&key);
                AttributeIR {
                    entity: a.entity.clone(),
                    label: label.to_string(),
                    role,
                    components: a.components.clone(),
                    key,
                }
            })
            .collect();

        let relationships = schema
            .relationships
            .iter()
            .map(|r| RelationshipIR {
                from: r.from.clone(),
                to: r.to.clone(),
                label: r.label.clone(),
                is_identifying: r.is_identifying,
                attributes: r
                    .attributes
                    .iter()
                    .map(|raw| {
                        let key = normalize_attribute(raw);
                        let (role, label) = AttributeRole::decode(&key);
                        RelAttributeIR {
                            label: label.to_string(),
                            role,
                            key,
                        }
                    })
                    .collect(),
            })
            .collect();

        ErGraph {
            entities,
            attributes,
            relationships,
            cardinalities: schema.cardinalities.clone(),
        }
    }

    pub fn attributes_of<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a AttributeIR> {
        self.attributes.iter().filter(move |a| a.entity == entity)
    }
}
