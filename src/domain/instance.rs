//! Model instances
//!
//! An instance carries the three base fields every model has (`id`,
//! `created_at`, `updated_at`) plus any number of dynamic attributes.

use chrono::{NaiveDateTime, SubsecRound, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use super::key::{generate_id, ObjectKey};
use super::value::{quote, AttrValue};

/// Timestamp format used in the serialized dictionary form
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Attribute names managed by the instance itself
pub const RESERVED_ATTRIBUTES: [&str; 4] = ["id", "created_at", "updated_at", "__class__"];

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Attribute '{0}' is managed by the model and cannot be set")]
    ReservedAttribute(String),

    #[error("Attribute name is empty")]
    EmptyAttributeName,

    #[error("Missing field '{0}' in stored object")]
    MissingField(&'static str),

    #[error("Invalid timestamp '{value}' in field '{field}'")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("Unsupported value for attribute '{0}'")]
    InvalidValue(String),
}

/// A stored model instance
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    class_name: String,
    id: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    attributes: BTreeMap<String, AttrValue>,
}

impl Instance {
    /// Creates a fresh instance with a new ID and current timestamps
    pub fn new(class_name: impl Into<String>) -> Self {
        let stamp = now();
        Self {
            class_name: class_name.into(),
            id: generate_id(),
            created_at: stamp,
            updated_at: stamp,
            attributes: BTreeMap::new(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    /// Returns the storage key for this instance
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(&self.class_name, &self.id)
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttrValue> {
        &self.attributes
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Sets a dynamic attribute, replacing any previous value
    pub fn set(&mut self, name: &str, value: AttrValue) -> Result<(), ModelError> {
        if name.is_empty() {
            return Err(ModelError::EmptyAttributeName);
        }
        if RESERVED_ATTRIBUTES.contains(&name) {
            return Err(ModelError::ReservedAttribute(name.to_string()));
        }
        self.attributes.insert(name.to_string(), value);
        Ok(())
    }

    /// Refreshes `updated_at`
    pub fn touch(&mut self) {
        self.updated_at = now();
    }

    /// Serializes to the dictionary form used by the storage backends
    pub fn to_dict(&self) -> Map<String, Value> {
        let mut dict = Map::new();
        dict.insert("__class__".into(), Value::String(self.class_name.clone()));
        dict.insert("id".into(), Value::String(self.id.clone()));
        dict.insert(
            "created_at".into(),
            Value::String(self.created_at.format(TIMESTAMP_FORMAT).to_string()),
        );
        dict.insert(
            "updated_at".into(),
            Value::String(self.updated_at.format(TIMESTAMP_FORMAT).to_string()),
        );
        for (name, value) in &self.attributes {
            let json = match value {
                AttrValue::Int(v) => Value::from(*v),
                AttrValue::Float(v) => Value::from(*v),
                AttrValue::Str(s) => Value::String(s.clone()),
            };
            dict.insert(name.clone(), json);
        }
        dict
    }

    /// Rebuilds an instance from its dictionary form
    pub fn from_dict(dict: &Map<String, Value>) -> Result<Self, ModelError> {
        let class_name = string_field(dict, "__class__")?;
        let id = string_field(dict, "id")?;
        let created_at = timestamp_field(dict, "created_at")?;
        let updated_at = timestamp_field(dict, "updated_at")?;

        let mut attributes = BTreeMap::new();
        for (name, value) in dict {
            if RESERVED_ATTRIBUTES.contains(&name.as_str()) {
                continue;
            }
            let value: AttrValue = serde_json::from_value(value.clone())
                .map_err(|_| ModelError::InvalidValue(name.clone()))?;
            attributes.insert(name.clone(), value);
        }

        Ok(Self {
            class_name,
            id,
            created_at,
            updated_at,
            attributes,
        })
    }

    /// Rebuilds an instance from separately stored parts
    pub fn from_parts(
        class_name: String,
        id: String,
        created_at: &str,
        updated_at: &str,
        attributes: BTreeMap<String, AttrValue>,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            class_name,
            id,
            created_at: parse_timestamp("created_at", created_at)?,
            updated_at: parse_timestamp("updated_at", updated_at)?,
            attributes,
        })
    }
}

/// Current UTC time at the precision the dictionary form keeps
fn now() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}

fn string_field(dict: &Map<String, Value>, field: &'static str) -> Result<String, ModelError> {
    dict.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(ModelError::MissingField(field))
}

fn timestamp_field(
    dict: &Map<String, Value>,
    field: &'static str,
) -> Result<NaiveDateTime, ModelError> {
    let raw = dict
        .get(field)
        .and_then(Value::as_str)
        .ok_or(ModelError::MissingField(field))?;
    parse_timestamp(field, raw)
}

fn parse_timestamp(field: &'static str, raw: &str) -> Result<NaiveDateTime, ModelError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|_| {
        ModelError::InvalidTimestamp {
            field,
            value: raw.to_string(),
        }
    })
}

/// `[Class] (id) {"id": ..., "created_at": ..., "updated_at": ..., attrs...}`
impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] ({}) {{\"id\": {}, \"created_at\": {}, \"updated_at\": {}",
            self.class_name,
            self.id,
            quote(&self.id),
            quote(&self.created_at.format(TIMESTAMP_FORMAT).to_string()),
            quote(&self.updated_at.format(TIMESTAMP_FORMAT).to_string()),
        )?;
        for (name, value) in &self.attributes {
            write!(f, ", {}: {}", quote(name), value)?;
        }
        write!(f, "}}")
    }
}
