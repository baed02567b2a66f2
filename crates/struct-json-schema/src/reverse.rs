//! JSON Schema to schema conversion
//!
//! Dispatch is keyword driven. Keywords that only narrow the accepted values
//! (`allOf`, `oneOf`, `not`, `if`/`then`/`else`) become refinements layered
//! over the schema built from the remaining keywords. The rest pick the
//! variant in this order: `nullable`, object and array types, `anyOf`,
//! `enum`, `const`, the leaf types. A fragment nothing recognizes accepts
//! any JSON value, unless the converter runs in [`Strictness::Strict`].

use crate::fragment::{Arrayable, Definition, JsonSchema};
use regex::Regex;
use serde_json::Value;
use struct_schema::{Literal, Path, Schema};
use thiserror::Error;
use tracing::debug;

/// Keywords that never change which values are accepted
const ANNOTATIONS: &[&str] = &[
    "$schema",
    "$id",
    "$comment",
    "title",
    "description",
    "deprecated",
    "default",
    "examples",
    "readOnly",
    "writeOnly",
    "nullable",
];

/// What to do with fragments that no rule recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Accept any JSON value in their place
    #[default]
    Lenient,
    /// Fail with [`ReverseError::Unrecognized`]
    Strict,
}

/// Reverse conversion configuration
#[derive(Debug, Clone)]
pub struct ReverseConfig {
    /// Handling of unrecognized fragments
    pub strictness: Strictness,
    /// Deepest fragment nesting converted before giving up
    pub max_depth: usize,
}

impl Default for ReverseConfig {
    fn default() -> Self {
        Self {
            strictness: Strictness::Lenient,
            max_depth: 64,
        }
    }
}

/// Why a JSON Schema document could not be converted
///
/// Paths are keyword locations inside the document, e.g.
/// `["properties"]["name"]`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReverseError {
    #[error("Invalid pattern at {path}: {message}")]
    InvalidPattern { message: String, path: Path },

    #[error("Invalid value for `{keyword}` at {path}")]
    InvalidKeyword { keyword: String, path: Path },

    #[error("Nesting deeper than {limit} levels at {path}")]
    DepthExceeded { limit: usize, path: Path },

    #[error("Unrecognized JSON Schema fragment at {path} with keywords {}", .keywords.join(", "))]
    Unrecognized { keywords: Vec<String>, path: Path },
}

impl ReverseError {
    fn invalid(keyword: &str) -> Self {
        ReverseError::InvalidKeyword {
            keyword: keyword.to_string(),
            path: Path::root(),
        }
    }

    /// Location of the offending fragment
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ReverseError::InvalidPattern { path, .. }
            | ReverseError::InvalidKeyword { path, .. }
            | ReverseError::DepthExceeded { path, .. }
            | ReverseError::Unrecognized { path, .. } => path,
        }
    }

    /// Prepend a location segment
    #[must_use]
    pub fn at(mut self, segment: impl Into<String>) -> Self {
        match &mut self {
            ReverseError::InvalidPattern { path, .. }
            | ReverseError::InvalidKeyword { path, .. }
            | ReverseError::DepthExceeded { path, .. }
            | ReverseError::Unrecognized { path, .. } => path.prepend(segment),
        }
        self
    }
}

/// Crate-local result type for the reverse conversion.
pub type Result<T> = std::result::Result<T, ReverseError>;

/// Convert a JSON Schema document with the default configuration
///
/// # Errors
///
/// Fails only on malformed documents: a bad regex, a keyword with the wrong
/// value type, or nesting beyond the depth limit.
pub fn to_schema(document: &JsonSchema) -> Result<Schema> {
    Reverser::new().convert(document)
}

impl JsonSchema {
    /// Shorthand for [`to_schema`]
    ///
    /// # Errors
    ///
    /// See [`to_schema`].
    pub fn to_schema(&self) -> Result<Schema> {
        to_schema(self)
    }
}

/// Reverse conversion engine
#[derive(Debug, Clone, Default)]
pub struct Reverser {
    config: ReverseConfig,
}

impl Reverser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with specific configuration
    #[must_use]
    pub fn with_config(config: ReverseConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ReverseConfig {
        &self.config
    }

    /// Convert a whole document
    ///
    /// # Errors
    ///
    /// See [`to_schema`]; strict mode additionally rejects unrecognized
    /// fragments.
    pub fn convert(&self, document: &JsonSchema) -> Result<Schema> {
        debug!(
            keywords = document.len(),
            strictness = ?self.config.strictness,
            "Converting JSON Schema to schema"
        );
        self.node(document, 0)
    }

    fn node(&self, fragment: &JsonSchema, depth: usize) -> Result<Schema> {
        if depth > self.config.max_depth {
            return Err(ReverseError::DepthExceeded {
                limit: self.config.max_depth,
                path: Path::root(),
            });
        }
        let schema = self.variant(fragment, depth)?;
        annotate(fragment, schema)
    }

    /// A position that may hold a boolean schema
    fn definition(&self, value: &Value, keyword: &str, depth: usize) -> Result<Schema> {
        match Definition::classify(value) {
            Some(Definition::Schema(fragment)) => self.node(&fragment, depth + 1),
            Some(Definition::Boolean(true)) => Ok(Schema::json()),
            Some(Definition::Boolean(false)) => Ok(Schema::never()),
            None => Err(ReverseError::invalid(keyword)),
        }
    }

    /// Definitions listed under `keyword`, if present
    fn members(
        &self,
        fragment: &JsonSchema,
        keyword: &str,
        depth: usize,
    ) -> Result<Option<Vec<Schema>>> {
        if !fragment.contains(keyword) {
            return Ok(None);
        }
        let items = fragment
            .get_array(keyword)
            .ok_or_else(|| ReverseError::invalid(keyword))?;
        items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                self.definition(item, keyword, depth)
                    .map_err(|error| error.at(idx.to_string()).at(keyword))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    fn variant(&self, fragment: &JsonSchema, depth: usize) -> Result<Schema> {
        if fragment.get_bool("nullable") == Some(true) {
            let inner = without(fragment, &["nullable", "description", "deprecated"]);
            return Ok(Schema::null(self.node(&inner, depth + 1)?));
        }

        if let Some(schema) = self.refinement(fragment, depth)? {
            return Ok(schema);
        }

        match fragment.get_str("type") {
            Some("object") => return self.object(fragment, depth),
            Some("array") => return self.array(fragment, depth),
            _ => {}
        }

        if let Some(schema) = self.choice(fragment, depth)? {
            return Ok(schema);
        }

        if let Some(type_value) = fragment.get("type") {
            if let Some(schema) = self.typed(fragment, type_value, depth)? {
                return Ok(schema);
            }
        }

        self.fallback(fragment)
    }

    fn refinement(&self, fragment: &JsonSchema, depth: usize) -> Result<Option<Schema>> {
        if let Some(members) = self.members(fragment, "allOf", depth)? {
            let base = self.variant(&without(fragment, &["allOf"]), depth)?;
            return Ok(Some(base.refine("allOf", move |input| {
                if members.iter().all(|member| member.accepts(input)) {
                    Ok(())
                } else {
                    Err("Should pass for all schemas of the allOf property".to_string())
                }
            })));
        }

        if let Some(members) = self.members(fragment, "oneOf", depth)? {
            let base = self.variant(&without(fragment, &["oneOf"]), depth)?;
            return Ok(Some(base.refine("oneOf", move |input| {
                let passed = members.iter().filter(|member| member.accepts(input)).count();
                if passed == 1 {
                    Ok(())
                } else {
                    Err("Should pass single schema according to the oneOf property".to_string())
                }
            })));
        }

        if let Some(value) = fragment.get("not") {
            let excluded = self
                .definition(value, "not", depth)
                .map_err(|error| error.at("not"))?;
            let base = self.variant(&without(fragment, &["not"]), depth)?;
            return Ok(Some(base.refine("not", move |input| {
                if excluded.accepts(input) {
                    Err("Should NOT be valid against schema in the not property".to_string())
                } else {
                    Ok(())
                }
            })));
        }

        if let (Some(condition), Some(then), Some(otherwise)) =
            (fragment.get("if"), fragment.get("then"), fragment.get("else"))
        {
            let condition = self
                .definition(condition, "if", depth)
                .map_err(|error| error.at("if"))?;
            let then = self
                .definition(then, "then", depth)
                .map_err(|error| error.at("then"))?;
            let otherwise = self
                .definition(otherwise, "else", depth)
                .map_err(|error| error.at("else"))?;
            let base = self.variant(&without(fragment, &["if", "then", "else"]), depth)?;
            return Ok(Some(base.refine("if", move |input| {
                if condition.accepts(input) {
                    then.accepts(input)
                        .then_some(())
                        .ok_or_else(|| "Should pass the then schema".to_string())
                } else {
                    otherwise
                        .accepts(input)
                        .then_some(())
                        .ok_or_else(|| "Should pass the else schema".to_string())
                }
            })));
        }

        Ok(None)
    }

    fn object(&self, fragment: &JsonSchema, depth: usize) -> Result<Schema> {
        let additional = fragment
            .get("additionalProperties")
            .map(|value| {
                Definition::classify(value)
                    .ok_or_else(|| ReverseError::invalid("additionalProperties"))
            })
            .transpose()?;

        let Some(properties) = fragment.get("properties") else {
            return match additional {
                Some(Definition::Schema(value)) => {
                    let value = self
                        .node(&value, depth + 1)
                        .map_err(|error| error.at("additionalProperties"))?;
                    Ok(Schema::dict(value))
                }
                Some(Definition::Boolean(true)) => Ok(Schema::dict(Schema::json())),
                Some(Definition::Boolean(false)) => Ok(empty_object().strict()),
                None => Ok(empty_object()),
            };
        };

        let Value::Object(properties) = properties else {
            return Err(ReverseError::invalid("properties"));
        };
        let required = required_fields(fragment)?;

        let mut fields = Vec::with_capacity(properties.len());
        for (name, definition) in properties {
            let schema = self
                .definition(definition, "properties", depth)
                .map_err(|error| error.at(name.as_str()).at("properties"))?;
            let schema = if required.contains(&name.as_str()) {
                schema
            } else {
                match definition.get("default") {
                    Some(default) => Schema::option(schema).with_default(default.clone()),
                    None => Schema::option(schema),
                }
            };
            fields.push((name.clone(), schema));
        }

        let object = Schema::object(fields);
        Ok(match additional {
            Some(Definition::Boolean(false)) => object.strict(),
            _ => object,
        })
    }

    fn array(&self, fragment: &JsonSchema, depth: usize) -> Result<Schema> {
        let item = match fragment.get("items").map(Arrayable::classify) {
            Some(Arrayable::Array(items)) => {
                let items = items
                    .into_iter()
                    .enumerate()
                    .map(|(idx, item)| {
                        self.definition(item, "items", depth)
                            .map_err(|error| error.at(idx.to_string()).at("items"))
                    })
                    .collect::<Result<Vec<_>>>()?;
                return Ok(Schema::tuple(items));
            }
            Some(Arrayable::Single(item)) => self
                .definition(item, "items", depth)
                .map_err(|error| error.at("items"))?,
            None => Schema::json(),
        };

        let mut schema = Schema::array(item);
        if let Some(min) = count(fragment, "minItems")? {
            schema = schema.min_length(min);
        }
        if let Some(max) = count(fragment, "maxItems")? {
            schema = schema.max_length(max);
        }
        Ok(schema)
    }

    fn choice(&self, fragment: &JsonSchema, depth: usize) -> Result<Option<Schema>> {
        if let Some(members) = self.members(fragment, "anyOf", depth)? {
            return Ok(Some(collapse(members)));
        }

        if fragment.contains("enum") {
            let values = fragment
                .get_array("enum")
                .ok_or_else(|| ReverseError::invalid("enum"))?;
            return Ok(Some(collapse(values.iter().map(constant).collect())));
        }

        Ok(fragment.get("const").map(constant))
    }

    fn typed(&self, fragment: &JsonSchema, type_value: &Value, depth: usize) -> Result<Option<Schema>> {
        let name = match Arrayable::classify(type_value) {
            Arrayable::Array(types) => {
                let single = without(fragment, &["description", "deprecated"]);
                let members = types
                    .into_iter()
                    .enumerate()
                    .map(|(idx, type_name)| {
                        let mut single = single.clone();
                        single.insert("type", type_name.clone());
                        self.node(&single, depth + 1)
                            .map_err(|error| error.at(idx.to_string()).at("type"))
                    })
                    .collect::<Result<Vec<_>>>()?;
                return Ok(Some(collapse(members)));
            }
            Arrayable::Single(Value::String(name)) => name.as_str(),
            Arrayable::Single(_) => return Err(ReverseError::invalid("type")),
        };

        let integral_number = fragment.get_str("format") == Some("int64")
            || fragment.get_f64("multipleOf") == Some(1.0);

        let schema = match name {
            "string" => string(fragment)?,
            "integer" => integer(fragment)?,
            "number" if integral_number => integer(fragment)?,
            "number" => float(fragment)?,
            "boolean" => Schema::bool(),
            "null" => Schema::literal(Literal::Null),
            _ => return Ok(None),
        };
        Ok(Some(schema))
    }

    fn fallback(&self, fragment: &JsonSchema) -> Result<Schema> {
        let unrecognized: Vec<String> = fragment
            .keywords()
            .filter(|keyword| !ANNOTATIONS.contains(keyword))
            .map(str::to_string)
            .collect();

        if !unrecognized.is_empty() {
            if self.config.strictness == Strictness::Strict {
                return Err(ReverseError::Unrecognized {
                    keywords: unrecognized,
                    path: Path::root(),
                });
            }
            debug!(keywords = ?unrecognized, "Unrecognized fragment accepts any JSON value");
        }

        Ok(Schema::json())
    }
}

fn string(fragment: &JsonSchema) -> Result<Schema> {
    let mut schema = Schema::string();

    if let Some(pattern) = fragment.get("pattern") {
        let pattern = pattern
            .as_str()
            .ok_or_else(|| ReverseError::invalid("pattern"))?;
        let regex = Regex::new(pattern).map_err(|error| ReverseError::InvalidPattern {
            message: error.to_string(),
            path: Path::root(),
        })?;
        schema = schema.pattern(regex);
    }
    if let Some(min) = count(fragment, "minLength")? {
        schema = schema.min_length(min);
    }
    if let Some(max) = count(fragment, "maxLength")? {
        schema = schema.max_length(max);
    }

    Ok(match fragment.get_str("format") {
        Some("date-time") => schema.datetime(),
        Some("email") => schema.email(),
        Some("uri") => schema.url(),
        Some("uuid") => schema.uuid(),
        Some(format) => {
            debug!(format, "Ignoring unsupported string format");
            schema
        }
        None => schema,
    })
}

#[allow(clippy::cast_possible_truncation)] // Out-of-range bounds saturate.
fn integer(fragment: &JsonSchema) -> Result<Schema> {
    let mut schema = Schema::int();
    if let Some(min) = bound(fragment, "minimum")? {
        schema = schema.int_min(min.ceil() as i64);
    }
    if let Some(min) = bound(fragment, "exclusiveMinimum")? {
        schema = schema.int_min((min.floor() as i64).saturating_add(1));
    }
    if let Some(max) = bound(fragment, "maximum")? {
        schema = schema.int_max(max.floor() as i64);
    }
    if let Some(max) = bound(fragment, "exclusiveMaximum")? {
        schema = schema.int_max((max.ceil() as i64).saturating_sub(1));
    }
    Ok(schema)
}

fn float(fragment: &JsonSchema) -> Result<Schema> {
    let mut schema = Schema::float();
    if let Some(min) = bound(fragment, "minimum")? {
        schema = schema.float_min(min);
    }
    if let Some(min) = bound(fragment, "exclusiveMinimum")? {
        schema = schema.float_exclusive_min(min);
    }
    if let Some(max) = bound(fragment, "maximum")? {
        schema = schema.float_max(max);
    }
    if let Some(max) = bound(fragment, "exclusiveMaximum")? {
        schema = schema.float_exclusive_max(max);
    }
    Ok(schema)
}

fn annotate(fragment: &JsonSchema, mut schema: Schema) -> Result<Schema> {
    match fragment.get("description") {
        Some(Value::String(text)) => schema = schema.describe(text.as_str()),
        Some(_) => return Err(ReverseError::invalid("description")),
        None => {}
    }
    match fragment.get("deprecated") {
        Some(Value::Bool(true)) => schema = schema.deprecated(),
        Some(Value::Bool(false)) | None => {}
        Some(_) => return Err(ReverseError::invalid("deprecated")),
    }
    Ok(schema)
}

fn required_fields(fragment: &JsonSchema) -> Result<Vec<&str>> {
    let Some(required) = fragment.get("required") else {
        return Ok(Vec::new());
    };
    required
        .as_array()
        .and_then(|names| names.iter().map(Value::as_str).collect::<Option<Vec<_>>>())
        .ok_or_else(|| ReverseError::invalid("required"))
}

/// Schema accepting exactly `value`
fn constant(value: &Value) -> Schema {
    match Literal::from_json(value) {
        Some(literal) => Schema::literal(literal),
        None => {
            let expected = value.clone();
            Schema::json().refine("const", move |input| {
                if *input == expected {
                    Ok(())
                } else {
                    Err(format!("Expected {expected}"))
                }
            })
        }
    }
}

/// No members accept anything, one member stands alone, more form a union
fn collapse(members: Vec<Schema>) -> Schema {
    match <[Schema; 1]>::try_from(members) {
        Ok([only]) => only,
        Err(members) if members.is_empty() => Schema::json(),
        Err(members) => Schema::union(members),
    }
}

fn empty_object() -> Schema {
    Schema::object(Vec::<(String, Schema)>::new())
}

fn without(fragment: &JsonSchema, keywords: &[&str]) -> JsonSchema {
    let mut rest = fragment.clone();
    for keyword in keywords {
        rest.remove(keyword);
    }
    rest
}

/// Non-negative integer keyword such as `minItems`
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Checked integral and non-negative.
fn count(fragment: &JsonSchema, keyword: &str) -> Result<Option<usize>> {
    let Some(value) = fragment.get(keyword) else {
        return Ok(None);
    };
    let count = match value.as_u64() {
        Some(count) => usize::try_from(count).ok(),
        None => value
            .as_f64()
            .filter(|count| count.fract() == 0.0 && *count >= 0.0)
            .map(|count| count as usize),
    };
    count
        .map(Some)
        .ok_or_else(|| ReverseError::invalid(keyword))
}

fn bound(fragment: &JsonSchema, keyword: &str) -> Result<Option<f64>> {
    fragment
        .get(keyword)
        .map(|value| value.as_f64().ok_or_else(|| ReverseError::invalid(keyword)))
        .transpose()
}
