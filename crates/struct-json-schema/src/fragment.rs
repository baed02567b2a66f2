//! JSON Schema fragments and draft-07 keyword helpers

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Dialect written to the `$schema` keyword of every produced document
pub const SCHEMA_DIALECT: &str = "http://json-schema.org/draft-07/schema#";

/// Errors raised while loading a fragment from text
#[derive(Error, Debug)]
pub enum FragmentError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Expected a JSON Schema object, found {0}")]
    NotAnObject(String),
}

/// A JSON object representing part or all of a JSON Schema document
///
/// Keys keep insertion order, so produced documents list keywords and
/// properties in the order the schema declared them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonSchema(Map<String, Value>);

impl JsonSchema {
    /// Empty fragment, accepting every value
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fragment holding just a `type` keyword
    #[must_use]
    pub fn with_type(type_name: &str) -> Self {
        let mut fragment = Self::new();
        fragment.insert("type", type_name);
        fragment
    }

    /// Parse a fragment from JSON text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or not a JSON object.
    pub fn from_json_str(text: &str) -> Result<Self, FragmentError> {
        let value: Value = serde_json::from_str(text)?;
        Self::try_from(value)
    }

    /// Parse a fragment from YAML text, as found in OpenAPI documents
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not YAML or not a mapping.
    pub fn from_yaml_str(text: &str) -> Result<Self, FragmentError> {
        let value: Value = serde_yaml::from_str(text)?;
        Self::try_from(value)
    }

    #[must_use]
    pub fn get(&self, keyword: &str) -> Option<&Value> {
        self.0.get(keyword)
    }

    #[must_use]
    pub fn get_str(&self, keyword: &str) -> Option<&str> {
        self.get(keyword).and_then(Value::as_str)
    }

    #[must_use]
    pub fn get_bool(&self, keyword: &str) -> Option<bool> {
        self.get(keyword).and_then(Value::as_bool)
    }

    #[must_use]
    pub fn get_f64(&self, keyword: &str) -> Option<f64> {
        self.get(keyword).and_then(Value::as_f64)
    }

    #[must_use]
    pub fn get_array(&self, keyword: &str) -> Option<&Vec<Value>> {
        self.get(keyword).and_then(Value::as_array)
    }

    #[must_use]
    pub fn contains(&self, keyword: &str) -> bool {
        self.0.contains_key(keyword)
    }

    /// Set a keyword, replacing any previous value
    pub fn insert(&mut self, keyword: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(keyword.into(), value.into());
    }

    pub fn remove(&mut self, keyword: &str) -> Option<Value> {
        self.0.remove(keyword)
    }

    /// Shallow merge: every key of `other` overwrites the same key here
    pub fn merge(&mut self, other: &JsonSchema) {
        for (keyword, value) in &other.0 {
            self.0.insert(keyword.clone(), value.clone());
        }
    }

    /// Consuming form of [`JsonSchema::merge`]
    #[must_use]
    pub fn merged(mut self, other: &JsonSchema) -> Self {
        self.merge(other);
        self
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for JsonSchema {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<JsonSchema> for Value {
    fn from(fragment: JsonSchema) -> Self {
        fragment.into_value()
    }
}

impl TryFrom<Value> for JsonSchema {
    type Error = FragmentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(FragmentError::NotAnObject(
                struct_schema::error::describe_value(&other),
            )),
        }
    }
}

/// A keyword value that is either one item or a list of items (`items`, `type`)
#[derive(Debug, Clone, PartialEq)]
pub enum Arrayable<T> {
    Single(T),
    Array(Vec<T>),
}

impl<'a> Arrayable<&'a Value> {
    #[must_use]
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => Arrayable::Array(items.iter().collect()),
            single => Arrayable::Single(single),
        }
    }
}

/// A schema position that may hold a boolean schema (`additionalProperties`, properties)
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Schema(JsonSchema),
    Boolean(bool),
}

impl Definition {
    /// `None` when the value is neither an object nor a boolean
    #[must_use]
    pub fn classify(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Definition::Schema(JsonSchema(map.clone()))),
            Value::Bool(b) => Some(Definition::Boolean(*b)),
            _ => None,
        }
    }
}
