//! Schema model definitions
#![allow(clippy::return_self_not_must_use)] // Builder setters are designed for chaining.

use crate::checks::{ArrayCheck, Check, CustomCheck, FloatCheck, IntCheck, StringCheck};
use crate::metadata::{Metadata, MetadataId};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Function half of a [`Transform`]
pub type TransformFn = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

/// Lazily produced default value
pub type DefaultFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// A typed description of accepted JSON values
///
/// Schemas are built once by the caller and then only read. Every setter
/// takes the schema by value and hands back the updated one, so a schema
/// that was cloned before a setter call is never affected by it.
#[derive(Debug, Clone)]
pub struct Schema {
    kind: SchemaKind,
    checks: Vec<Check>,
    transforms: Vec<Transform>,
    description: Option<String>,
    deprecation: Option<Deprecation>,
    default: Option<DefaultValue>,
    metadata: Metadata,
    name: Option<String>,
}

/// The closed set of schema variants
#[derive(Debug, Clone)]
pub enum SchemaKind {
    Never,
    Unknown,
    String,
    Int,
    Float,
    Bool,
    Literal(Literal),
    /// Value may be absent; only meaningful as an object field
    Option(Box<Schema>),
    /// Value may additionally be JSON `null`
    Null(Box<Schema>),
    Array(Box<Schema>),
    Tuple(Vec<Schema>),
    Union(Vec<Schema>),
    Object(ObjectSchema),
    Dict(Box<Schema>),
}

/// A single constant value accepted by a literal schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    String(String),
    Number(f64),
    Bool(bool),
    Null,
    /// The "no value" placeholder; has no JSON representation
    Undefined,
    /// Not-a-number; has no JSON representation
    NaN,
}

/// Fields and unknown-key handling of an object schema
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    pub fields: Vec<Field>,
    pub unknown_keys: UnknownKeys,
}

/// A named object field
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub schema: Schema,
}

/// What an object schema does with keys it does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnknownKeys {
    /// Tolerate and drop them
    #[default]
    Strip,
    /// Reject them
    Strict,
}

/// Deprecation notice
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Deprecation {
    pub message: Option<String>,
}

/// Provider of a field's default value
#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    Callback(DefaultFn),
}

/// Value conversion applied after parsing and reverted before serializing
#[derive(Clone, Default)]
pub struct Transform {
    parser: Option<TransformFn>,
    serializer: Option<TransformFn>,
}

impl Literal {
    /// Build a numeric literal, mapping NaN to [`Literal::NaN`]
    #[must_use]
    pub fn number(value: f64) -> Self {
        if value.is_nan() {
            Literal::NaN
        } else {
            Literal::Number(value)
        }
    }

    /// Build a literal from a JSON scalar; arrays and objects return `None`
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Literal::Null),
            Value::Bool(b) => Some(Literal::Bool(*b)),
            Value::Number(n) => n.as_f64().map(Literal::number),
            Value::String(s) => Some(Literal::String(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// JSON form of the literal, `None` for the placeholders
    ///
    /// Integral numbers are rendered as JSON integers.
    #[must_use]
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Literal::String(s) => Some(Value::String(s.clone())),
            Literal::Number(n) => Some(number_to_json(*n)),
            Literal::Bool(b) => Some(Value::Bool(*b)),
            Literal::Null => Some(Value::Null),
            Literal::Undefined | Literal::NaN => None,
        }
    }

    /// Whether `value` equals this literal
    #[must_use]
    #[allow(clippy::float_cmp)] // Literals match their exact value only.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Literal::String(expected), Value::String(s)) => expected == s,
            (Literal::Number(expected), Value::Number(n)) => {
                n.as_f64().is_some_and(|n| n == *expected)
            }
            (Literal::Bool(expected), Value::Bool(b)) => expected == b,
            (Literal::Null, Value::Null) => true,
            _ => false,
        }
    }

    /// Whether the numeric literal has no fractional part
    #[must_use]
    pub fn is_integral(&self) -> bool {
        matches!(self, Literal::Number(n) if n.fract() == 0.0 && n.is_finite())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "\"{s}\""),
            Literal::Number(n) => write!(f, "{}", number_to_json(*n)),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Null => f.write_str("null"),
            Literal::Undefined => f.write_str("undefined"),
            Literal::NaN => f.write_str("NaN"),
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::String(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::number(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Number(f64::from(value))
    }
}

#[allow(clippy::cast_possible_truncation)] // Guarded by the range check.
fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl DefaultValue {
    /// Produce the default value
    #[must_use]
    pub fn resolve(&self) -> Value {
        match self {
            DefaultValue::Value(value) => value.clone(),
            DefaultValue::Callback(callback) => callback(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
            DefaultValue::Callback(_) => f.write_str("Callback"),
        }
    }
}

impl Transform {
    /// Create a transform with neither half set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the parse-direction conversion
    pub fn parser(
        mut self,
        parser: impl Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.parser = Some(Arc::new(parser));
        self
    }

    /// Set the serialize-direction conversion
    pub fn serializer(
        mut self,
        serializer: impl Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.serializer = Some(Arc::new(serializer));
        self
    }

    pub(crate) fn parse_fn(&self) -> Option<&TransformFn> {
        self.parser.as_ref()
    }

    pub(crate) fn serialize_fn(&self) -> Option<&TransformFn> {
        self.serializer.as_ref()
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("has_parser", &self.parser.is_some())
            .field("has_serializer", &self.serializer.is_some())
            .finish()
    }
}

impl Field {
    /// Create a field
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

impl Schema {
    fn from_kind(kind: SchemaKind) -> Self {
        Self {
            kind,
            checks: Vec::new(),
            transforms: Vec::new(),
            description: None,
            deprecation: None,
            default: None,
            metadata: Metadata::new(),
            name: None,
        }
    }

    /// Schema that rejects every value
    #[must_use]
    pub fn never() -> Self {
        Self::from_kind(SchemaKind::Never)
    }

    /// Schema that accepts every value
    #[must_use]
    pub fn unknown() -> Self {
        Self::from_kind(SchemaKind::Unknown)
    }

    /// Schema that accepts any JSON value, named `JSON`
    #[must_use]
    pub fn json() -> Self {
        Self::unknown().with_name("JSON")
    }

    #[must_use]
    pub fn string() -> Self {
        Self::from_kind(SchemaKind::String)
    }

    #[must_use]
    pub fn int() -> Self {
        Self::from_kind(SchemaKind::Int)
    }

    #[must_use]
    pub fn float() -> Self {
        Self::from_kind(SchemaKind::Float)
    }

    #[must_use]
    pub fn bool() -> Self {
        Self::from_kind(SchemaKind::Bool)
    }

    /// Schema accepting exactly one constant
    pub fn literal(value: impl Into<Literal>) -> Self {
        Self::from_kind(SchemaKind::Literal(value.into()))
    }

    /// Wrap a schema so the value may be absent
    #[must_use]
    pub fn option(inner: Schema) -> Self {
        Self::from_kind(SchemaKind::Option(Box::new(inner)))
    }

    /// Wrap a schema so the value may also be `null`
    #[must_use]
    pub fn null(inner: Schema) -> Self {
        Self::from_kind(SchemaKind::Null(Box::new(inner)))
    }

    #[must_use]
    pub fn array(item: Schema) -> Self {
        Self::from_kind(SchemaKind::Array(Box::new(item)))
    }

    #[must_use]
    pub fn tuple(items: Vec<Schema>) -> Self {
        Self::from_kind(SchemaKind::Tuple(items))
    }

    #[must_use]
    pub fn union(items: Vec<Schema>) -> Self {
        Self::from_kind(SchemaKind::Union(items))
    }

    /// Object schema with fields in declaration order
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        Self::from_kind(SchemaKind::Object(ObjectSchema {
            fields: fields
                .into_iter()
                .map(|(name, schema)| Field::new(name, schema))
                .collect(),
            unknown_keys: UnknownKeys::default(),
        }))
    }

    /// Object schema whose values all share one schema
    #[must_use]
    pub fn dict(value: Schema) -> Self {
        Self::from_kind(SchemaKind::Dict(Box::new(value)))
    }

    /// Variant of this node
    #[must_use]
    pub fn classify(&self) -> &SchemaKind {
        &self.kind
    }

    /// Whether this node is an Option
    #[must_use]
    pub fn is_optional(&self) -> bool {
        matches!(self.kind, SchemaKind::Option(_))
    }

    /// Declared refinements in declaration order
    #[must_use]
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    #[must_use]
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn deprecation(&self) -> Option<&Deprecation> {
        self.deprecation.as_ref()
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    #[must_use]
    pub fn metadata(&self, id: MetadataId) -> Option<&Value> {
        self.metadata.get(id)
    }

    /// Whether the node carries no description, deprecation, default or metadata
    #[must_use]
    pub fn is_bare(&self) -> bool {
        self.description.is_none()
            && self.deprecation.is_none()
            && self.default.is_none()
            && self.metadata.is_empty()
            && self.transforms.is_empty()
            && self.checks.is_empty()
    }

    /// Human-readable type description, e.g. `array<string | undefined>`
    #[must_use]
    pub fn name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        match &self.kind {
            SchemaKind::Never => "never".to_string(),
            SchemaKind::Unknown => "unknown".to_string(),
            SchemaKind::String => "string".to_string(),
            SchemaKind::Int => "int32".to_string(),
            SchemaKind::Float => "number".to_string(),
            SchemaKind::Bool => "boolean".to_string(),
            SchemaKind::Literal(literal) => literal.to_string(),
            SchemaKind::Option(inner) => format!("{} | undefined", inner.name()),
            SchemaKind::Null(inner) => format!("{} | null", inner.name()),
            SchemaKind::Array(item) => format!("array<{}>", item.name()),
            SchemaKind::Dict(value) => format!("dict<{}>", value.name()),
            SchemaKind::Tuple(items) => format!(
                "[{}]",
                items.iter().map(Schema::name).collect::<Vec<_>>().join(", ")
            ),
            SchemaKind::Union(items) => items
                .iter()
                .map(Schema::name)
                .collect::<Vec<_>>()
                .join(" | "),
            SchemaKind::Object(object) if object.fields.is_empty() => "{}".to_string(),
            SchemaKind::Object(object) => {
                let fields: String = object
                    .fields
                    .iter()
                    .map(|field| format!(" {}: {};", field.name, field.schema.name()))
                    .collect();
                format!("{{{fields} }}")
            }
        }
    }

    /// Override the name reported by [`Schema::name`]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a description
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark as deprecated with an explanation
    pub fn deprecate(mut self, message: impl Into<String>) -> Self {
        self.deprecation = Some(Deprecation {
            message: Some(message.into()),
        });
        self
    }

    /// Mark as deprecated without an explanation
    pub fn deprecated(mut self) -> Self {
        self.deprecation = Some(Deprecation::default());
        self
    }

    /// Value used when the field is absent
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(DefaultValue::Value(value));
        self
    }

    /// Like [`Schema::with_default`], producing the value on demand
    pub fn with_default_fn(mut self, callback: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.default = Some(DefaultValue::Callback(Arc::new(callback)));
        self
    }

    /// Store a metadata entry, replacing the previous one
    pub fn with_metadata(mut self, id: MetadataId, value: Value) -> Self {
        self.metadata.set(id, value);
        self
    }

    /// Add a transform applied after the previously added ones
    pub fn transform(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }

    /// Add a named predicate check
    pub fn refine(
        mut self,
        name: impl Into<String>,
        predicate: impl Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.checks
            .push(Check::Custom(CustomCheck::new(name, predicate)));
        self
    }

    /// Add a prebuilt check
    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    fn string_check(self, check: StringCheck) -> Self {
        self.check(Check::String(check))
    }

    pub fn email(self) -> Self {
        self.string_check(StringCheck::Email)
    }

    pub fn uuid(self) -> Self {
        self.string_check(StringCheck::Uuid)
    }

    pub fn cuid(self) -> Self {
        self.string_check(StringCheck::Cuid)
    }

    pub fn url(self) -> Self {
        self.string_check(StringCheck::Url)
    }

    /// RFC 3339 date-time strings
    pub fn datetime(self) -> Self {
        self.string_check(StringCheck::Datetime)
    }

    pub fn pattern(self, pattern: Regex) -> Self {
        self.string_check(StringCheck::Pattern(pattern))
    }

    /// Minimum length; applies to string and array schemas
    pub fn min_length(self, min: usize) -> Self {
        if matches!(self.kind, SchemaKind::Array(_)) {
            self.check(Check::Array(ArrayCheck::Min(min)))
        } else {
            self.string_check(StringCheck::Min(min))
        }
    }

    /// Maximum length; applies to string and array schemas
    pub fn max_length(self, max: usize) -> Self {
        if matches!(self.kind, SchemaKind::Array(_)) {
            self.check(Check::Array(ArrayCheck::Max(max)))
        } else {
            self.string_check(StringCheck::Max(max))
        }
    }

    /// Exact length; applies to string and array schemas
    pub fn length(self, len: usize) -> Self {
        if matches!(self.kind, SchemaKind::Array(_)) {
            self.check(Check::Array(ArrayCheck::Length(len)))
        } else {
            self.string_check(StringCheck::Length(len))
        }
    }

    pub fn int_min(self, min: i64) -> Self {
        self.check(Check::Int(IntCheck::Min(min)))
    }

    pub fn int_max(self, max: i64) -> Self {
        self.check(Check::Int(IntCheck::Max(max)))
    }

    pub fn port(self) -> Self {
        self.check(Check::Int(IntCheck::Port))
    }

    pub fn float_min(self, min: f64) -> Self {
        self.check(Check::Float(FloatCheck::Min(min)))
    }

    pub fn float_max(self, max: f64) -> Self {
        self.check(Check::Float(FloatCheck::Max(max)))
    }

    pub fn float_exclusive_min(self, min: f64) -> Self {
        self.check(Check::Float(FloatCheck::ExclusiveMin(min)))
    }

    pub fn float_exclusive_max(self, max: f64) -> Self {
        self.check(Check::Float(FloatCheck::ExclusiveMax(max)))
    }

    /// Reject undeclared keys; no effect on non-object schemas
    pub fn strict(self) -> Self {
        self.with_unknown_keys(UnknownKeys::Strict)
    }

    /// Drop undeclared keys; no effect on non-object schemas
    pub fn strip(self) -> Self {
        self.with_unknown_keys(UnknownKeys::Strip)
    }

    fn with_unknown_keys(mut self, policy: UnknownKeys) -> Self {
        if let SchemaKind::Object(object) = &mut self.kind {
            object.unknown_keys = policy;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_names() {
        assert_eq!(Schema::string().name(), "string");
        assert_eq!(
            Schema::dict(Schema::option(Schema::string())).name(),
            "dict<string | undefined>"
        );
        assert_eq!(
            Schema::array(Schema::option(Schema::string())).name(),
            "array<string | undefined>"
        );
        assert_eq!(
            Schema::tuple(vec![Schema::option(Schema::string())]).name(),
            "[string | undefined]"
        );
        assert_eq!(
            Schema::union(vec![
                Schema::option(Schema::string()),
                Schema::null(Schema::string())
            ])
            .name(),
            "string | undefined | string | null"
        );
        assert_eq!(Schema::literal(Literal::Undefined).name(), "undefined");
        assert_eq!(Schema::literal(f64::NAN).name(), "NaN");
        assert_eq!(Schema::literal("Yes").name(), "\"Yes\"");
        assert_eq!(
            Schema::object([("a", Schema::string()), ("b", Schema::int())]).name(),
            "{ a: string; b: int32; }"
        );
        assert_eq!(Schema::json().name(), "JSON");
    }

    #[test]
    fn test_setters_do_not_affect_clones() {
        let original = Schema::string();
        let described = original.clone().describe("text");

        assert_eq!(original.description(), None);
        assert_eq!(described.description(), Some("text"));
    }

    #[test]
    fn test_length_dispatches_on_kind() {
        let string = Schema::string().min_length(1);
        assert!(matches!(string.checks()[0], Check::String(StringCheck::Min(1))));

        let array = Schema::array(Schema::string()).min_length(1);
        assert!(matches!(array.checks()[0], Check::Array(ArrayCheck::Min(1))));
    }

    #[test]
    fn test_strict_only_touches_objects() {
        let object = Schema::object([("a", Schema::string())]).strict();
        match object.classify() {
            SchemaKind::Object(object) => assert_eq!(object.unknown_keys, UnknownKeys::Strict),
            other => panic!("unexpected kind {other:?}"),
        }

        let string = Schema::string().strict();
        assert!(matches!(string.classify(), SchemaKind::String));
    }

    #[test]
    fn test_literal_json() {
        assert_eq!(Literal::number(123.0).to_json(), Some(json!(123)));
        assert_eq!(Literal::number(-123.456).to_json(), Some(json!(-123.456)));
        assert_eq!(Literal::Undefined.to_json(), None);
        assert_eq!(Literal::number(f64::NAN), Literal::NaN);
        assert!(Literal::number(2.0).is_integral());
        assert!(!Literal::number(2.5).is_integral());
        assert_eq!(Literal::from_json(&json!([1])), None);
        assert!(Literal::from("a").matches(&json!("a")));
        assert!(Literal::from(1).matches(&json!(1.0)));
    }

    #[test]
    fn test_number_literals_match_exactly() {
        assert!(!Literal::from(0).matches(&json!(1e-17)));
        assert!(!Literal::from(1e-20).matches(&json!(2e-20)));
        assert!(Literal::from(1e-20).matches(&json!(1e-20)));
        assert!(!Schema::literal(0).accepts(&json!(1e-17)));
    }

    #[test]
    fn test_default_callback() {
        let schema = Schema::option(Schema::string()).with_default_fn(|| json!("fallback"));
        assert_eq!(schema.default_value().unwrap().resolve(), json!("fallback"));
    }

    #[test]
    fn test_is_bare() {
        assert!(Schema::literal("a").is_bare());
        assert!(!Schema::literal("a").describe("letter").is_bare());
    }
}
