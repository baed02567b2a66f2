//! Schema to JSON Schema conversion

use crate::error::{ConversionError, Reason, Result};
use crate::extend::SCHEMA_EXTEND;
use crate::fragment::{JsonSchema, SCHEMA_DIALECT};
use serde_json::{json, Map, Value};
use struct_schema::{
    ArrayCheck, Check, FloatCheck, IntCheck, Literal, ObjectSchema, Schema, SchemaKind,
    StringCheck, UnknownKeys,
};
use tracing::{debug, trace};

/// Types that can describe themselves as a JSON Schema document
pub trait ToJsonSchema {
    /// Build the draft-07 document
    ///
    /// # Errors
    ///
    /// Returns an error if part of the description has no JSON Schema form.
    fn to_json_schema(&self) -> Result<JsonSchema>;
}

impl ToJsonSchema for Schema {
    fn to_json_schema(&self) -> Result<JsonSchema> {
        try_make(self)
    }
}

/// Convert a schema into a JSON Schema document
///
/// # Errors
///
/// Returns the formatted conversion error, e.g.
/// `[ReScript JSON Schema] Failed converting at root. Reason: Optional schema is not supported at root`.
pub fn make(schema: &Schema) -> std::result::Result<JsonSchema, String> {
    try_make(schema).map_err(|error| error.to_string())
}

/// Like [`make`], keeping the structured error
///
/// # Errors
///
/// Returns the reason and location of the first node that cannot be
/// converted. Nothing is produced for the rest of the tree.
pub fn try_make(schema: &Schema) -> Result<JsonSchema> {
    debug!(schema = %schema.name(), "Converting schema to JSON Schema");

    if schema.is_optional() {
        return Err(Reason::UnsupportedRootOptional.into());
    }
    let body = convert(schema)?;

    // `$schema` leads the document and cannot be overridden by extensions.
    let mut document = JsonSchema::new();
    document.insert("$schema", SCHEMA_DIALECT);
    document.merge(&body);
    document.insert("$schema", SCHEMA_DIALECT);
    Ok(document)
}

fn convert(schema: &Schema) -> Result<JsonSchema> {
    trace!(schema = %schema.name(), "Converting node");

    let mut fragment = match schema.classify() {
        SchemaKind::Never => {
            let mut fragment = JsonSchema::new();
            fragment.insert("not", json!({}));
            fragment
        }
        SchemaKind::Unknown => JsonSchema::new(),
        SchemaKind::String => string_fragment(schema),
        SchemaKind::Int => number_fragment("integer", schema),
        SchemaKind::Float => number_fragment("number", schema),
        SchemaKind::Bool => JsonSchema::with_type("boolean"),
        SchemaKind::Literal(literal) => literal_fragment(schema, literal)?,
        SchemaKind::Option(inner) => {
            if inner.is_optional() {
                return Err(Reason::UnsupportedNestedOptional.into());
            }
            convert(inner)?
        }
        SchemaKind::Null(inner) => {
            let inner = convert_item(schema, inner)?;
            let mut fragment = JsonSchema::new();
            fragment.insert(
                "anyOf",
                vec![inner.into_value(), json!({"type": "null"})],
            );
            fragment
        }
        SchemaKind::Array(item) => {
            let mut fragment = JsonSchema::with_type("array");
            fragment.insert("items", convert_item(schema, item)?);
            apply_array_checks(schema, &mut fragment);
            fragment
        }
        SchemaKind::Tuple(items) => {
            let items = items
                .iter()
                .enumerate()
                .map(|(idx, item)| {
                    convert_item(schema, item)
                        .map(JsonSchema::into_value)
                        .map_err(|error| error.at(idx.to_string()))
                })
                .collect::<Result<Vec<_>>>()?;
            let len = items.len();
            let mut fragment = JsonSchema::with_type("array");
            fragment.insert("items", items);
            fragment.insert("minItems", len);
            fragment.insert("maxItems", len);
            fragment
        }
        SchemaKind::Union(items) => union_fragment(schema, items)?,
        SchemaKind::Object(object) => object_fragment(object)?,
        SchemaKind::Dict(value) => {
            let mut fragment = JsonSchema::with_type("object");
            fragment.insert("additionalProperties", convert_item(schema, value)?);
            fragment
        }
    };

    annotate(schema, &mut fragment)?;
    Ok(fragment)
}

/// Convert a child whose required-ness has no meaning in the container
fn convert_item(container: &Schema, item: &Schema) -> Result<JsonSchema> {
    if item.is_optional() {
        return Err(Reason::UnsupportedOptionalItem(container.name()).into());
    }
    convert(item)
}

fn string_fragment(schema: &Schema) -> JsonSchema {
    let mut fragment = JsonSchema::with_type("string");
    for check in schema.checks() {
        let Check::String(check) = check else {
            continue;
        };
        match check {
            StringCheck::Min(min) => fragment.insert("minLength", *min),
            StringCheck::Max(max) => fragment.insert("maxLength", *max),
            StringCheck::Length(len) => {
                fragment.insert("minLength", *len);
                fragment.insert("maxLength", *len);
            }
            StringCheck::Email => fragment.insert("format", "email"),
            StringCheck::Uuid => fragment.insert("format", "uuid"),
            StringCheck::Url => fragment.insert("format", "uri"),
            StringCheck::Datetime => fragment.insert("format", "date-time"),
            StringCheck::Pattern(regex) => fragment.insert("pattern", regex.as_str()),
            // No draft-07 format for cuids.
            StringCheck::Cuid => {}
        }
    }
    fragment
}

fn number_fragment(type_name: &str, schema: &Schema) -> JsonSchema {
    let mut fragment = JsonSchema::with_type(type_name);
    for check in schema.checks() {
        match check {
            Check::Int(IntCheck::Min(min)) => fragment.insert("minimum", *min),
            Check::Int(IntCheck::Max(max)) => fragment.insert("maximum", *max),
            Check::Float(FloatCheck::Min(min)) => fragment.insert("minimum", number(*min)),
            Check::Float(FloatCheck::Max(max)) => fragment.insert("maximum", number(*max)),
            Check::Float(FloatCheck::ExclusiveMin(min)) => {
                fragment.insert("exclusiveMinimum", number(*min));
            }
            Check::Float(FloatCheck::ExclusiveMax(max)) => {
                fragment.insert("exclusiveMaximum", number(*max));
            }
            _ => {}
        }
    }
    fragment
}

fn apply_array_checks(schema: &Schema, fragment: &mut JsonSchema) {
    for check in schema.checks() {
        match check {
            Check::Array(ArrayCheck::Min(min)) => fragment.insert("minItems", *min),
            Check::Array(ArrayCheck::Max(max)) => fragment.insert("maxItems", *max),
            Check::Array(ArrayCheck::Length(len)) => {
                fragment.insert("minItems", *len);
                fragment.insert("maxItems", *len);
            }
            _ => {}
        }
    }
}

fn literal_fragment(schema: &Schema, literal: &Literal) -> Result<JsonSchema> {
    let Some(value) = literal.to_json() else {
        return Err(Reason::UnsupportedVariant(schema.name()).into());
    };
    let type_name = match literal {
        Literal::String(_) => "string",
        Literal::Number(_) if literal.is_integral() => "integer",
        Literal::Number(_) => "number",
        Literal::Bool(_) => "boolean",
        Literal::Null | Literal::Undefined | Literal::NaN => {
            return Ok(JsonSchema::with_type("null"));
        }
    };
    let mut fragment = JsonSchema::with_type(type_name);
    fragment.insert("const", value);
    Ok(fragment)
}

fn union_fragment(schema: &Schema, items: &[Schema]) -> Result<JsonSchema> {
    let mut fragment = JsonSchema::new();

    // Plain literal alternatives collapse into a single `enum`.
    let literals: Option<Vec<Value>> = items
        .iter()
        .map(|item| match item.classify() {
            SchemaKind::Literal(literal) if item.is_bare() => literal.to_json(),
            _ => None,
        })
        .collect();
    if let Some(values) = literals.filter(|values| !values.is_empty()) {
        fragment.insert("enum", values);
        return Ok(fragment);
    }

    let any_of = items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            convert_item(schema, item)
                .map(JsonSchema::into_value)
                .map_err(|error| error.at(idx.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;
    fragment.insert("anyOf", any_of);
    Ok(fragment)
}

fn object_fragment(object: &ObjectSchema) -> Result<JsonSchema> {
    let mut properties = Map::with_capacity(object.fields.len());
    let mut required = Vec::new();

    for field in &object.fields {
        let property = convert(&field.schema).map_err(|error| error.at(field.name.as_str()))?;
        if !field.schema.is_optional() {
            required.push(Value::from(field.name.as_str()));
        }
        properties.insert(field.name.clone(), property.into_value());
    }

    let mut fragment = JsonSchema::with_type("object");
    fragment.insert("properties", properties);
    fragment.insert(
        "additionalProperties",
        object.unknown_keys == UnknownKeys::Strip,
    );
    if !required.is_empty() {
        fragment.insert("required", required);
    }
    Ok(fragment)
}

/// Merge description, deprecation, default and extension keywords
fn annotate(schema: &Schema, fragment: &mut JsonSchema) -> Result<()> {
    if let Some(description) = schema.description() {
        fragment.insert("description", description);
    }

    if let Some(deprecation) = schema.deprecation() {
        fragment.insert("deprecated", true);
        if let Some(message) = &deprecation.message {
            fragment.insert("description", message.as_str());
        }
    }

    if let Some(default) = schema.default_value() {
        let value = schema.serialize(&default.resolve()).map_err(|error| {
            debug!(%error, "Default value failed to serialize");
            ConversionError::new(Reason::DefaultSerializationFailed(error.to_string()))
        })?;
        fragment.insert("default", value);
    }

    if let Some(Value::Object(extension)) = schema.metadata(SCHEMA_EXTEND) {
        fragment.merge(&JsonSchema::from(extension.clone()));
    }

    Ok(())
}

fn number(value: f64) -> Value {
    Literal::number(value).to_json().unwrap_or(Value::Null)
}
