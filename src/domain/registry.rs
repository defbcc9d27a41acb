//! Registered model classes
//!
//! The registry maps a class name to a factory and a declared field list.
//! It is built once at startup; commands look classes up by name only.

use std::collections::BTreeMap;

use super::instance::Instance;
use super::value::AttrValue;

/// Builds a fresh, empty instance of a class
pub type Factory = fn(&'static str) -> Instance;

/// Declared type of a model field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    Int,
    Float,
}

impl FieldKind {
    /// Returns true if a value of this shape fits the declared kind
    ///
    /// Integers are accepted where floats are declared.
    pub fn accepts(&self, value: &AttrValue) -> bool {
        matches!(
            (self, value),
            (FieldKind::Str, AttrValue::Str(_))
                | (FieldKind::Int, AttrValue::Int(_))
                | (FieldKind::Float, AttrValue::Float(_))
                | (FieldKind::Float, AttrValue::Int(_))
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Str => "string",
            FieldKind::Int => "int",
            FieldKind::Float => "float",
        }
    }
}

/// A declared model field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> Field {
    Field { name, kind }
}

/// A declared field holding a value of the wrong type
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaViolation {
    pub field: &'static str,
    pub message: String,
}

fn plain_instance(name: &'static str) -> Instance {
    Instance::new(name)
}

/// A class known to the console
#[derive(Debug, Clone, Copy)]
pub struct ModelClass {
    pub name: &'static str,
    pub fields: &'static [Field],
    factory: Factory,
}

impl ModelClass {
    /// Creates a class whose factory builds a plain instance
    pub const fn new(name: &'static str, fields: &'static [Field]) -> Self {
        Self {
            name,
            fields,
            factory: plain_instance,
        }
    }

    /// Replaces the factory used by [`ModelClass::instantiate`]
    pub const fn with_factory(self, factory: Factory) -> Self {
        Self { factory, ..self }
    }

    /// Builds a fresh instance of this class
    pub fn instantiate(&self) -> Instance {
        (self.factory)(self.name)
    }

    /// Compares an instance's attributes with the declared fields
    ///
    /// Undeclared attributes are allowed and never reported.
    pub fn validate(&self, instance: &Instance) -> Vec<SchemaViolation> {
        self.fields
            .iter()
            .filter_map(|field| {
                let value = instance.get(field.name)?;
                if field.kind.accepts(value) {
                    None
                } else {
                    Some(SchemaViolation {
                        field: field.name,
                        message: format!(
                            "expected {}, got {} ({})",
                            field.kind.as_str(),
                            value.kind(),
                            value
                        ),
                    })
                }
            })
            .collect()
    }
}

use FieldKind::{Float, Int, Str};

const BASE_MODEL_FIELDS: &[Field] = &[];

const USER_FIELDS: &[Field] = &[
    field("email", Str),
    field("password", Str),
    field("first_name", Str),
    field("last_name", Str),
];

const STATE_FIELDS: &[Field] = &[field("name", Str)];

const CITY_FIELDS: &[Field] = &[field("state_id", Str), field("name", Str)];

const AMENITY_FIELDS: &[Field] = &[field("name", Str)];

const PLACE_FIELDS: &[Field] = &[
    field("city_id", Str),
    field("user_id", Str),
    field("name", Str),
    field("description", Str),
    field("number_rooms", Int),
    field("number_bathrooms", Int),
    field("max_guest", Int),
    field("price_by_night", Int),
    field("latitude", Float),
    field("longitude", Float),
];

const REVIEW_FIELDS: &[Field] = &[
    field("place_id", Str),
    field("user_id", Str),
    field("text", Str),
];

/// Name-keyed set of model classes
#[derive(Debug, Clone, Default)]
pub struct Registry {
    classes: BTreeMap<&'static str, ModelClass>,
}

impl Registry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the registry of built-in HBnB models
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(ModelClass::new("BaseModel", BASE_MODEL_FIELDS));
        registry.register(ModelClass::new("User", USER_FIELDS));
        registry.register(ModelClass::new("State", STATE_FIELDS));
        registry.register(ModelClass::new("City", CITY_FIELDS));
        registry.register(ModelClass::new("Amenity", AMENITY_FIELDS));
        registry.register(ModelClass::new("Place", PLACE_FIELDS));
        registry.register(ModelClass::new("Review", REVIEW_FIELDS));
        registry
    }

    /// Adds or replaces a class
    pub fn register(&mut self, class: ModelClass) {
        self.classes.insert(class.name, class);
    }

    pub fn get(&self, name: &str) -> Option<&ModelClass> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Class names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.classes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
