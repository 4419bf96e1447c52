//! # Schema Collaborator
//!
//! The compiler only ever reads the schema: given an entity type and a property
//! name it needs the declared type and whether the property navigates to
//! another entity. Entity definition and persistence mapping live elsewhere.
//!
//! ```rust
//! use fluent_criteria::schema::{EntityType, PropertyType, ScalarType, Schema, SchemaProvider};
//!
//! let schema = Schema::builder()
//!     .entity(
//!         EntityType::new("Borrower")
//!             .scalar("Key", ScalarType::Int32)
//!             .scalar("Name", ScalarType::String)
//!             .collection("Loans", "Loan"),
//!     )
//!     .build();
//!
//! let loans = schema.property("Borrower", "Loans").unwrap();
//! assert!(loans.declared.is_navigation());
//! ```

use crate::error::{CriteriaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Leaf value types a property can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    Bool,
    Int32,
    Int64,
    Float64,
    Decimal,
    String,
    Date,
    DateTime,
    Uuid,
}

impl ScalarType {
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ScalarType::Int32 | ScalarType::Int64 | ScalarType::Float64 | ScalarType::Decimal
        )
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, ScalarType::Date | ScalarType::DateTime)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Bool => "bool",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Float64 => "float64",
            ScalarType::Decimal => "decimal",
            ScalarType::String => "string",
            ScalarType::Date => "date",
            ScalarType::DateTime => "datetime",
            ScalarType::Uuid => "uuid",
        };
        f.write_str(name)
    }
}

/// Declared type of a property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    Scalar(ScalarType),
    /// Nullable scalar column
    Optional(ScalarType),
    /// To-one relationship
    Entity(String),
    /// To-many relationship
    Collection(Box<PropertyType>),
    /// Keyed relationship (two generic arguments)
    Map(Box<PropertyType>, Box<PropertyType>),
}

impl PropertyType {
    pub fn collection_of(entity: impl Into<String>) -> Self {
        PropertyType::Collection(Box::new(PropertyType::Entity(entity.into())))
    }

    /// Relationship properties create joins when traversed
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            PropertyType::Entity(_) | PropertyType::Collection(_) | PropertyType::Map(_, _)
        )
    }

    /// Number of generic type arguments the declared type carries
    pub fn generic_arity(&self) -> usize {
        match self {
            PropertyType::Collection(_) => 1,
            PropertyType::Map(_, _) => 2,
            _ => 0,
        }
    }

    /// Entity reached by navigating this property, if it is a plain relationship
    pub fn target_entity(&self) -> Option<&str> {
        match self {
            PropertyType::Entity(name) => Some(name),
            PropertyType::Collection(element) => match element.as_ref() {
                PropertyType::Entity(name) => Some(name),
                _ => None,
            },
            _ => None,
        }
    }

    /// Scalar type used for operand conversion.
    ///
    /// Optional numeric and temporal types unwrap to their underlying type, so a
    /// nullable integer column compares exactly like its non-nullable counterpart.
    pub fn comparison_type(&self) -> Option<ScalarType> {
        match self {
            PropertyType::Scalar(scalar) => Some(*scalar),
            PropertyType::Optional(scalar) if scalar.is_numeric() || scalar.is_temporal() => {
                Some(*scalar)
            }
            _ => None,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyType::Scalar(scalar) => write!(f, "{scalar}"),
            PropertyType::Optional(scalar) => write!(f, "{scalar}?"),
            PropertyType::Entity(name) => f.write_str(name),
            PropertyType::Collection(element) => write!(f, "list<{element}>"),
            PropertyType::Map(key, value) => write!(f, "map<{key}, {value}>"),
        }
    }
}

/// A single declared property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    pub declared: PropertyType,
}

/// A named type with scalar and navigation properties in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityType {
    pub name: String,
    pub properties: Vec<PropertyDef>,
}

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    pub fn property(mut self, name: impl Into<String>, declared: PropertyType) -> Self {
        self.properties.push(PropertyDef {
            name: name.into(),
            declared,
        });
        self
    }

    pub fn scalar(self, name: impl Into<String>, scalar: ScalarType) -> Self {
        self.property(name, PropertyType::Scalar(scalar))
    }

    pub fn optional(self, name: impl Into<String>, scalar: ScalarType) -> Self {
        self.property(name, PropertyType::Optional(scalar))
    }

    pub fn reference(self, name: impl Into<String>, entity: impl Into<String>) -> Self {
        self.property(name, PropertyType::Entity(entity.into()))
    }

    pub fn collection(self, name: impl Into<String>, entity: impl Into<String>) -> Self {
        self.property(name, PropertyType::collection_of(entity))
    }

    pub fn find(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Properties that can be projected as plain columns
    pub fn scalar_properties(&self) -> impl Iterator<Item = &PropertyDef> {
        self.properties.iter().filter(|p| !p.declared.is_navigation())
    }
}

/// Rust types that describe themselves as an entity type
pub trait Entity {
    fn entity_type() -> EntityType;

    fn entity_name() -> String {
        Self::entity_type().name
    }
}

/// Read access to entity metadata
pub trait SchemaProvider: Send + Sync {
    fn entity(&self, name: &str) -> Option<&EntityType>;

    fn require_entity(&self, name: &str) -> Result<&EntityType> {
        self.entity(name)
            .ok_or_else(|| CriteriaError::unknown_entity(name))
    }

    /// Declared property, failing with `UnknownProperty` when absent
    fn property(&self, entity: &str, name: &str) -> Result<&PropertyDef> {
        self.require_entity(entity)?
            .find(name)
            .ok_or_else(|| CriteriaError::unknown_property(entity, name))
    }
}

/// In-memory schema registry
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entities: HashMap<String, EntityType>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl SchemaProvider for Schema {
    fn entity(&self, name: &str) -> Option<&EntityType> {
        self.entities.get(name)
    }
}

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    entities: HashMap<String, EntityType>,
}

impl SchemaBuilder {
    pub fn entity(mut self, entity: EntityType) -> Self {
        self.entities.insert(entity.name.clone(), entity);
        self
    }

    pub fn register<T: Entity>(self) -> Self {
        self.entity(T::entity_type())
    }

    pub fn build(self) -> Schema {
        Schema {
            entities: self.entities,
        }
    }
}
