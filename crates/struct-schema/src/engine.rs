//! Parse and serialize engine
//!
//! Parsing walks the schema and the input JSON side by side, rejecting the
//! first value that does not fit and reporting its location. Serializing
//! runs the same walk in reverse, undoing transforms before the structural
//! pass.

use crate::error::{describe_value, Error, ErrorCode, Operation};
use crate::model::{ObjectSchema, Schema, SchemaKind};
use crate::Result;
use serde_json::{Map, Value};
use tracing::trace;

impl Schema {
    /// Validate `input` and produce the parsed value
    ///
    /// # Errors
    ///
    /// Returns the first rejected value with its location.
    pub fn parse(&self, input: &Value) -> Result<Value> {
        let mut value = self.parse_kind(input)?;

        for check in self.checks() {
            check
                .run(&value)
                .map_err(|reason| Error::new(Operation::Parsing, ErrorCode::CheckFailed(reason)))?;
        }

        for transform in self.transforms() {
            if let Some(parser) = transform.parse_fn() {
                value = parser(value).map_err(|reason| {
                    Error::new(Operation::Parsing, ErrorCode::TransformFailed(reason))
                })?;
            }
        }

        Ok(value)
    }

    /// Whether `input` parses successfully
    #[must_use]
    pub fn accepts(&self, input: &Value) -> bool {
        self.parse(input).is_ok()
    }

    /// Convert a parsed value back into JSON
    ///
    /// # Errors
    ///
    /// Fails when a transform has no serializer, or the value does not fit
    /// the schema's shape.
    pub fn serialize(&self, value: &Value) -> Result<Value> {
        let mut value = value.clone();

        for transform in self.transforms().iter().rev() {
            let serializer = transform
                .serialize_fn()
                .ok_or_else(|| Error::new(Operation::Serializing, ErrorCode::MissingSerializer))?;
            value = serializer(value).map_err(|reason| {
                Error::new(Operation::Serializing, ErrorCode::TransformFailed(reason))
            })?;
        }

        self.serialize_kind(&value)
    }

    /// Value used for an object field that is missing from the input
    fn parse_missing(&self) -> Result<Option<Value>> {
        if !self.is_optional() {
            return Err(Error::new(Operation::Parsing, ErrorCode::MissingField));
        }
        Ok(self.default_value().map(crate::model::DefaultValue::resolve))
    }

    fn type_error(&self, operation: Operation, received: &Value) -> Error {
        Error::invalid_type(operation, self.name(), received)
    }

    fn parse_kind(&self, input: &Value) -> Result<Value> {
        let op = Operation::Parsing;
        match self.classify() {
            SchemaKind::Never => Err(self.type_error(op, input)),
            SchemaKind::Unknown => Ok(input.clone()),
            SchemaKind::String if input.is_string() => Ok(input.clone()),
            SchemaKind::Int => as_integer(input).ok_or_else(|| self.type_error(op, input)),
            SchemaKind::Float if input.is_number() => Ok(input.clone()),
            SchemaKind::Bool if input.is_boolean() => Ok(input.clone()),
            SchemaKind::String | SchemaKind::Float | SchemaKind::Bool => {
                Err(self.type_error(op, input))
            }
            SchemaKind::Literal(literal) => {
                if literal.matches(input) {
                    Ok(literal.to_json().unwrap_or_else(|| input.clone()))
                } else {
                    Err(Error::new(
                        op,
                        ErrorCode::InvalidLiteral {
                            expected: literal.to_string(),
                            received: describe_value(input),
                        },
                    ))
                }
            }
            SchemaKind::Option(inner) => inner.parse(input),
            SchemaKind::Null(inner) => {
                if input.is_null() {
                    Ok(Value::Null)
                } else {
                    inner.parse(input)
                }
            }
            SchemaKind::Array(item) => {
                let items = input.as_array().ok_or_else(|| self.type_error(op, input))?;
                items
                    .iter()
                    .enumerate()
                    .map(|(idx, value)| item.parse(value).map_err(|e| e.at(idx.to_string())))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Array)
            }
            SchemaKind::Tuple(schemas) => {
                let items = input.as_array().ok_or_else(|| self.type_error(op, input))?;
                if items.len() != schemas.len() {
                    return Err(Error::new(
                        op,
                        ErrorCode::InvalidTupleSize {
                            expected: schemas.len(),
                            received: items.len(),
                        },
                    ));
                }
                schemas
                    .iter()
                    .zip(items)
                    .enumerate()
                    .map(|(idx, (schema, value))| {
                        schema.parse(value).map_err(|e| e.at(idx.to_string()))
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Array)
            }
            SchemaKind::Union(schemas) => {
                let mut reasons = Vec::with_capacity(schemas.len());
                for schema in schemas {
                    match schema.parse(input) {
                        Ok(value) => return Ok(value),
                        Err(error) => {
                            trace!(member = %schema.name(), %error, "union member rejected value");
                            reasons.push(error.code.to_string());
                        }
                    }
                }
                Err(Error::new(op, ErrorCode::InvalidUnion(reasons)))
            }
            SchemaKind::Object(object) => {
                let map = input.as_object().ok_or_else(|| self.type_error(op, input))?;
                parse_object(object, map)
            }
            SchemaKind::Dict(value_schema) => {
                let map = input.as_object().ok_or_else(|| self.type_error(op, input))?;
                let mut output = Map::with_capacity(map.len());
                for (key, value) in map {
                    let parsed = value_schema.parse(value).map_err(|e| e.at(key.as_str()))?;
                    output.insert(key.clone(), parsed);
                }
                Ok(Value::Object(output))
            }
        }
    }

    fn serialize_kind(&self, value: &Value) -> Result<Value> {
        let op = Operation::Serializing;
        match self.classify() {
            SchemaKind::Never => Err(self.type_error(op, value)),
            SchemaKind::Unknown => Ok(value.clone()),
            SchemaKind::String if value.is_string() => Ok(value.clone()),
            SchemaKind::Int => as_integer(value).ok_or_else(|| self.type_error(op, value)),
            SchemaKind::Float if value.is_number() => Ok(value.clone()),
            SchemaKind::Bool if value.is_boolean() => Ok(value.clone()),
            SchemaKind::String | SchemaKind::Float | SchemaKind::Bool => {
                Err(self.type_error(op, value))
            }
            SchemaKind::Literal(literal) => match literal.to_json() {
                Some(json) if literal.matches(value) => Ok(json),
                _ => Err(Error::new(
                    op,
                    ErrorCode::InvalidLiteral {
                        expected: literal.to_string(),
                        received: describe_value(value),
                    },
                )),
            },
            SchemaKind::Option(inner) => inner.serialize(value),
            SchemaKind::Null(inner) => {
                if value.is_null() {
                    Ok(Value::Null)
                } else {
                    inner.serialize(value)
                }
            }
            SchemaKind::Array(item) => {
                let items = value.as_array().ok_or_else(|| self.type_error(op, value))?;
                items
                    .iter()
                    .enumerate()
                    .map(|(idx, v)| item.serialize(v).map_err(|e| e.at(idx.to_string())))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Array)
            }
            SchemaKind::Tuple(schemas) => {
                let items = value.as_array().ok_or_else(|| self.type_error(op, value))?;
                if items.len() != schemas.len() {
                    return Err(Error::new(
                        op,
                        ErrorCode::InvalidTupleSize {
                            expected: schemas.len(),
                            received: items.len(),
                        },
                    ));
                }
                schemas
                    .iter()
                    .zip(items)
                    .enumerate()
                    .map(|(idx, (schema, v))| {
                        schema.serialize(v).map_err(|e| e.at(idx.to_string()))
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Array)
            }
            SchemaKind::Union(schemas) => {
                let mut reasons = Vec::with_capacity(schemas.len());
                for schema in schemas {
                    match schema.serialize(value) {
                        Ok(json) => return Ok(json),
                        Err(error) => reasons.push(error.code.to_string()),
                    }
                }
                Err(Error::new(op, ErrorCode::InvalidUnion(reasons)))
            }
            SchemaKind::Object(object) => {
                let map = value.as_object().ok_or_else(|| self.type_error(op, value))?;
                let mut output = Map::with_capacity(object.fields.len());
                for field in &object.fields {
                    match map.get(&field.name) {
                        Some(v) => {
                            let json = field
                                .schema
                                .serialize(v)
                                .map_err(|e| e.at(field.name.as_str()))?;
                            output.insert(field.name.clone(), json);
                        }
                        None if field.schema.is_optional() => {}
                        None => {
                            return Err(
                                Error::new(op, ErrorCode::MissingField).at(field.name.as_str())
                            );
                        }
                    }
                }
                Ok(Value::Object(output))
            }
            SchemaKind::Dict(value_schema) => {
                let map = value.as_object().ok_or_else(|| self.type_error(op, value))?;
                let mut output = Map::with_capacity(map.len());
                for (key, v) in map {
                    let json = value_schema.serialize(v).map_err(|e| e.at(key.as_str()))?;
                    output.insert(key.clone(), json);
                }
                Ok(Value::Object(output))
            }
        }
    }
}

fn parse_object(object: &ObjectSchema, input: &Map<String, Value>) -> Result<Value> {
    let mut output = Map::with_capacity(object.fields.len());

    for field in &object.fields {
        let parsed = match input.get(&field.name) {
            Some(value) => Some(field.schema.parse(value)),
            None => field.schema.parse_missing().transpose(),
        };
        if let Some(parsed) = parsed {
            let value = parsed.map_err(|e| e.at(field.name.as_str()))?;
            output.insert(field.name.clone(), value);
        }
    }

    if object.unknown_keys == crate::model::UnknownKeys::Strict {
        if let Some(key) = input
            .keys()
            .find(|key| !object.fields.iter().any(|field| &field.name == *key))
        {
            return Err(Error::new(
                Operation::Parsing,
                ErrorCode::UnexpectedKey(key.clone()),
            ));
        }
    }

    Ok(Value::Object(output))
}

/// Integer view of a JSON number, accepting integral floats
///
/// Integers beyond the `i64` range are rejected so integer checks always run.
#[allow(clippy::cast_possible_truncation)] // Guarded by the fract and range checks.
fn as_integer(value: &Value) -> Option<Value> {
    let Value::Number(number) = value else {
        return None;
    };
    if number.is_i64() {
        return Some(value.clone());
    }
    let float = number.as_f64()?;
    if float.fract() == 0.0 && float.abs() < 9_007_199_254_740_992.0 {
        Some(Value::from(float as i64))
    } else {
        None
    }
}
