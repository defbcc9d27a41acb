//! Object keys and instance identifiers
//!
//! Key format: `{ClassName}.{InstanceId}` (e.g., `User.1f0c3a52-...`)
//!
//! Instance IDs are random UUID v4 strings. Keys are split on the first
//! `.` only, so the class part never contains a dot.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum KeyError {
    #[error("Invalid object key: expected '{{class}}.{{id}}', got '{0}'")]
    InvalidKey(String),

    #[error("Object key has an empty class name: '{0}'")]
    EmptyClass(String),
}

/// Generates a fresh instance ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Key identifying a stored instance
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectKey {
    class_name: String,
    id: String,
}

impl ObjectKey {
    pub fn new(class_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            id: id.into(),
        }
    }

    /// Returns the class portion of the key
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Returns the instance ID portion of the key
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns true if the rendered key starts with `{class_name}.`
    ///
    /// This is a textual prefix test, so `count Us` never matches `User.*`.
    pub fn has_class_prefix(&self, class_name: &str) -> bool {
        self.to_string().starts_with(&format!("{}.", class_name))
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class_name, self.id)
    }
}

impl FromStr for ObjectKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (class_name, id) = s
            .split_once('.')
            .ok_or_else(|| KeyError::InvalidKey(s.to_string()))?;

        if class_name.is_empty() {
            return Err(KeyError::EmptyClass(s.to_string()));
        }

        Ok(Self::new(class_name, id))
    }
}

impl TryFrom<String> for ObjectKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ObjectKey> for String {
    fn from(key: ObjectKey) -> Self {
        key.to_string()
    }
}
