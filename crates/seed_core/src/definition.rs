//! Definition Model
//!
//! Passive descriptors produced by a script evaluator and consumed by the
//! builder. Nothing here knows about concrete entity types.

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;

/// Declarative description of one entity: target type, optional name and
/// properties in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityDefinition {
    pub type_name: String,
    pub name: Option<String>,
    pub properties: IndexMap<String, PropertyValue>,
}

impl EntityDefinition {
    /// Definition without a caller-chosen name.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: None,
            properties: IndexMap::new(),
        }
    }

    /// Definition registered under `name`.
    pub fn named(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: Some(name.into()),
            properties: IndexMap::new(),
        }
    }

    /// Add a property assignment.
    ///
    /// Setting the same property twice keeps its original position and the
    /// last value.
    pub fn with(mut self, property: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(property.into(), value.into());
        self
    }

    /// Name used in diagnostics; anonymous definitions report their type.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.type_name)
    }

    /// Number of definitions in this tree, including `self`.
    pub fn definition_count(&self) -> usize {
        1 + self
            .properties
            .values()
            .map(PropertyValue::definition_count)
            .sum::<usize>()
    }
}

/// Right-hand side of a property assignment.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Literal(Literal),
    /// Name of an entity that must already be registered.
    Reference(String),
    /// Entity built in place before the owning entity.
    Nested(Box<EntityDefinition>),
    /// Ordered collection.
    List(Vec<PropertyValue>),
    /// Unordered collection. Elements are still resolved in declared order.
    Set(Vec<PropertyValue>),
}

impl PropertyValue {
    pub fn reference(name: impl Into<String>) -> Self {
        PropertyValue::Reference(name.into())
    }

    fn definition_count(&self) -> usize {
        match self {
            PropertyValue::Literal(_) | PropertyValue::Reference(_) => 0,
            PropertyValue::Nested(definition) => definition.definition_count(),
            PropertyValue::List(items) | PropertyValue::Set(items) => {
                items.iter().map(PropertyValue::definition_count).sum()
            }
        }
    }
}

/// Opaque literal passed through to the entity unchanged.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl From<Literal> for PropertyValue {
    fn from(literal: Literal) -> Self {
        PropertyValue::Literal(literal)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Literal(Literal::String(value.to_string()))
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Literal(Literal::String(value))
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Literal(Literal::Int(value))
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Literal(Literal::Int(i64::from(value)))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Literal(Literal::Float(value))
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Literal(Literal::Bool(value))
    }
}

impl From<NaiveDate> for PropertyValue {
    fn from(value: NaiveDate) -> Self {
        PropertyValue::Literal(Literal::Date(value))
    }
}

impl From<NaiveDateTime> for PropertyValue {
    fn from(value: NaiveDateTime) -> Self {
        PropertyValue::Literal(Literal::DateTime(value))
    }
}

impl From<EntityDefinition> for PropertyValue {
    fn from(definition: EntityDefinition) -> Self {
        PropertyValue::Nested(Box::new(definition))
    }
}

impl From<Vec<PropertyValue>> for PropertyValue {
    fn from(items: Vec<PropertyValue>) -> Self {
        PropertyValue::List(items)
    }
}
