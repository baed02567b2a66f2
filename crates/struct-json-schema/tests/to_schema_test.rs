//! Integration tests for the JSON Schema to schema direction

mod common;

use common::{fragment, init_tracing};
use serde_json::{Value, json};
use struct_json_schema::{
    JsonSchema, ReverseConfig, ReverseError, Reverser, Strictness, make, to_schema,
};
use struct_schema::{Schema, SchemaKind, UnknownKeys};

fn reverse(value: Value) -> Schema {
    init_tracing();
    to_schema(&fragment(value)).expect("document converts")
}

#[test]
fn test_object_fields_and_required() {
    let schema = reverse(json!({
        "type": "object",
        "properties": {
            "id": {"type": "integer"},
            "nickname": {"type": "string"}
        },
        "required": ["id"]
    }));

    let SchemaKind::Object(object) = schema.classify() else {
        panic!("expected an object schema");
    };
    assert_eq!(object.unknown_keys, UnknownKeys::Strip);
    assert!(!object.fields[0].schema.is_optional());
    assert!(object.fields[1].schema.is_optional());

    assert!(schema.accepts(&json!({"id": 1})));
    assert!(schema.accepts(&json!({"id": 1, "nickname": "x", "extra": true})));
    assert!(!schema.accepts(&json!({"nickname": "x"})));
}

#[test]
fn test_optional_field_with_default() -> anyhow::Result<()> {
    let schema = reverse(json!({
        "type": "object",
        "properties": {"tags": {"type": "array", "items": {"type": "string"}, "default": []}}
    }));
    assert_eq!(schema.parse(&json!({}))?, json!({"tags": []}));
    Ok(())
}

#[test]
fn test_additional_properties_false_is_strict() {
    let schema = reverse(json!({
        "type": "object",
        "properties": {"a": {"type": "string"}},
        "required": ["a"],
        "additionalProperties": false
    }));
    assert!(schema.accepts(&json!({"a": "x"})));
    assert!(!schema.accepts(&json!({"a": "x", "b": 1})));
}

#[test]
fn test_object_without_properties() {
    let dict = reverse(json!({"type": "object", "additionalProperties": {"type": "integer"}}));
    assert!(matches!(dict.classify(), SchemaKind::Dict(_)));
    assert!(dict.accepts(&json!({"a": 1, "b": 2})));
    assert!(!dict.accepts(&json!({"a": "1"})));

    let anything = reverse(json!({"type": "object", "additionalProperties": true}));
    assert!(anything.accepts(&json!({"a": [1, {"b": null}]})));

    let nothing = reverse(json!({"type": "object", "additionalProperties": false}));
    assert!(nothing.accepts(&json!({})));
    assert!(!nothing.accepts(&json!({"a": 1})));

    let empty = reverse(json!({"type": "object"}));
    assert!(empty.accepts(&json!({"a": 1})));
    assert!(!empty.accepts(&json!([])));
}

#[test]
fn test_boolean_property_definitions() {
    let schema = reverse(json!({
        "type": "object",
        "properties": {"any": true, "none": false},
        "required": ["any"]
    }));
    assert!(schema.accepts(&json!({"any": [1, 2]})));
    assert!(!schema.accepts(&json!({"any": 1, "none": 1})));
}

#[test]
fn test_arrays() {
    let array = reverse(json!({
        "type": "array",
        "items": {"type": "number"},
        "minItems": 1,
        "maxItems": 2
    }));
    assert!(!array.accepts(&json!([])));
    assert!(array.accepts(&json!([1.5])));
    assert!(!array.accepts(&json!([1, 2, 3])));
    assert!(!array.accepts(&json!(["a"])));

    let untyped = reverse(json!({"type": "array", "minItems": 1}));
    assert!(untyped.accepts(&json!([null, "a"])));
    assert!(!untyped.accepts(&json!([])));
}

#[test]
fn test_tuple_ignores_item_counts() {
    let tuple = reverse(json!({
        "type": "array",
        "items": [{"type": "string"}, {"type": "boolean"}],
        "minItems": 5
    }));
    assert!(matches!(tuple.classify(), SchemaKind::Tuple(items) if items.len() == 2));
    assert!(tuple.accepts(&json!(["a", true])));
    assert!(!tuple.accepts(&json!([true, "a"])));
}

#[test]
fn test_any_of() {
    assert!(matches!(
        reverse(json!({"anyOf": []})).classify(),
        SchemaKind::Unknown
    ));
    assert!(matches!(
        reverse(json!({"anyOf": [{"type": "string"}]})).classify(),
        SchemaKind::String
    ));

    let union = reverse(json!({"anyOf": [{"type": "string"}, {"type": "integer"}]}));
    assert!(union.accepts(&json!("a")));
    assert!(union.accepts(&json!(1)));
    assert!(!union.accepts(&json!(true)));
}

#[test]
fn test_all_of() {
    let schema = reverse(json!({
        "allOf": [
            {"type": "integer", "minimum": 1},
            {"type": "integer", "maximum": 10}
        ]
    }));
    assert!(schema.accepts(&json!(5)));
    assert!(!schema.accepts(&json!(0)));
    assert!(!schema.accepts(&json!(11)));
}

#[test]
fn test_one_of() {
    let schema = reverse(json!({
        "oneOf": [
            {"type": "integer", "maximum": 5},
            {"type": "integer", "minimum": 3}
        ]
    }));
    assert!(schema.accepts(&json!(1)));
    assert!(schema.accepts(&json!(7)));
    assert!(!schema.accepts(&json!(4)));
}

#[test]
fn test_not() {
    let schema = reverse(json!({"not": {"type": "string"}}));
    assert!(schema.accepts(&json!(1)));
    assert!(!schema.accepts(&json!("a")));
}

#[test]
fn test_if_then_else() {
    let schema = reverse(json!({
        "if": {"type": "integer"},
        "then": {"type": "integer", "minimum": 10},
        "else": {"type": "string"}
    }));
    assert!(schema.accepts(&json!(12)));
    assert!(!schema.accepts(&json!(3)));
    assert!(schema.accepts(&json!("text")));
    assert!(!schema.accepts(&json!(true)));
}

#[test]
fn test_enum_and_const() {
    assert!(matches!(
        reverse(json!({"enum": []})).classify(),
        SchemaKind::Unknown
    ));
    assert!(matches!(
        reverse(json!({"enum": ["only"]})).classify(),
        SchemaKind::Literal(_)
    ));

    let rating = reverse(json!({"enum": ["G", "PG", 13, null]}));
    assert!(rating.accepts(&json!("PG")));
    assert!(rating.accepts(&json!(13)));
    assert!(rating.accepts(&Value::Null));
    assert!(!rating.accepts(&json!("R")));

    let constant = reverse(json!({"const": true}));
    assert!(constant.accepts(&json!(true)));
    assert!(!constant.accepts(&json!(false)));
}

#[test]
fn test_strings() {
    let schema = reverse(json!({
        "type": "string",
        "pattern": "^[a-z]+$",
        "minLength": 2,
        "maxLength": 4
    }));
    assert!(schema.accepts(&json!("abc")));
    assert!(!schema.accepts(&json!("a")));
    assert!(!schema.accepts(&json!("abcde")));
    assert!(!schema.accepts(&json!("AB")));

    let email = reverse(json!({"type": "string", "format": "email"}));
    assert!(email.accepts(&json!("dev@example.com")));
    assert!(!email.accepts(&json!("nope")));

    let datetime = reverse(json!({"type": "string", "format": "date-time"}));
    assert!(datetime.accepts(&json!("2024-05-01T10:00:00Z")));
    assert!(!datetime.accepts(&json!("yesterday")));

    let unknown_format = reverse(json!({"type": "string", "format": "hostname"}));
    assert!(unknown_format.accepts(&json!("anything at all")));
}

#[test]
fn test_numbers() {
    let float = reverse(json!({"type": "number", "minimum": 0.5, "exclusiveMaximum": 2}));
    assert!(float.accepts(&json!(0.5)));
    assert!(float.accepts(&json!(1.99)));
    assert!(!float.accepts(&json!(2)));
    assert!(!float.accepts(&json!(0.4)));

    let integer = reverse(json!({"type": "integer", "exclusiveMaximum": 3}));
    assert!(integer.accepts(&json!(2)));
    assert!(!integer.accepts(&json!(3)));
    assert!(!integer.accepts(&json!(2.5)));
}

#[test]
fn test_integer_bounds_beyond_i64_saturate() {
    let above = reverse(json!({"type": "integer", "exclusiveMinimum": 1e19}));
    assert!(!above.accepts(&json!(0)));
    assert!(!above.accepts(&json!(i64::MAX - 1)));

    let below = reverse(json!({"type": "integer", "exclusiveMaximum": -1e19}));
    assert!(!below.accepts(&json!(0)));
    assert!(!below.accepts(&json!(i64::MIN + 1)));

    let bounded = reverse(json!({"type": "integer", "maximum": 5}));
    assert!(bounded.accepts(&json!(5)));
    assert!(!bounded.accepts(&json!(u64::MAX)));
}

#[test]
fn test_numeric_constants_match_exactly() {
    let zero = reverse(json!({"const": 0}));
    assert!(zero.accepts(&json!(0)));
    assert!(!zero.accepts(&json!(1e-17)));

    let tiny = reverse(json!({"enum": [1e-20, 1]}));
    assert!(tiny.accepts(&json!(1e-20)));
    assert!(!tiny.accepts(&json!(2e-20)));
}

#[test]
fn test_type_list() {
    let schema = reverse(json!({"type": ["string", "null"], "description": "maybe text"}));
    assert_eq!(schema.description(), Some("maybe text"));
    assert!(schema.accepts(&json!("a")));
    assert!(schema.accepts(&Value::Null));
    assert!(!schema.accepts(&json!(1)));
}

#[test]
fn test_boolean_and_null_types() {
    assert!(matches!(reverse(json!({"type": "boolean"})).classify(), SchemaKind::Bool));
    let null = reverse(json!({"type": "null"}));
    assert!(null.accepts(&Value::Null));
    assert!(!null.accepts(&json!(0)));
}

#[test]
fn test_nullable() {
    let schema = reverse(json!({"type": "integer", "nullable": true, "description": "count"}));
    assert_eq!(schema.description(), Some("count"));
    let SchemaKind::Null(inner) = schema.classify() else {
        panic!("expected a null wrapper");
    };
    assert_eq!(inner.description(), None);
    assert!(schema.accepts(&Value::Null));
    assert!(schema.accepts(&json!(3)));
}

#[test]
fn test_annotations() {
    let schema = reverse(json!({"type": "string", "description": "name", "deprecated": true}));
    assert_eq!(schema.description(), Some("name"));
    assert!(schema.deprecation().is_some());
}

#[test]
fn test_unrecognized_fragment_accepts_anything_by_default() {
    // Lenient fallback: the `$ref` is not resolved and nothing is checked.
    let schema = reverse(json!({"$ref": "#/definitions/Thing"}));
    assert!(matches!(schema.classify(), SchemaKind::Unknown));
    assert!(schema.accepts(&json!({"any": "thing"})));
    assert!(schema.accepts(&json!(42)));

    let unknown_type = reverse(json!({"type": "decimal"}));
    assert!(unknown_type.accepts(&json!("1.0")));
}

#[test]
fn test_strict_mode_rejects_unrecognized_fragments() {
    init_tracing();
    let reverser = Reverser::with_config(ReverseConfig {
        strictness: Strictness::Strict,
        ..ReverseConfig::default()
    });

    let error = reverser
        .convert(&fragment(json!({
            "type": "object",
            "properties": {"link": {"$ref": "#/definitions/Link"}}
        })))
        .unwrap_err();
    assert_eq!(
        error,
        ReverseError::Unrecognized {
            keywords: vec!["$ref".to_string()],
            path: struct_schema::Path::from_segments(["properties", "link"]),
        }
    );

    // Annotation-only fragments are still fine.
    let schema = reverser
        .convert(&fragment(json!({"description": "anything"})))
        .unwrap();
    assert!(schema.accepts(&json!([1, 2])));
}

#[test]
fn test_typed_object_with_keyword_only_all_of_member() {
    init_tracing();
    let document = fragment(json!({
        "type": "object",
        "properties": {"id": {"type": "string"}},
        "allOf": [{"required": ["id"]}]
    }));

    // Strict: the member has no recognized keywords of its own.
    let strict = Reverser::with_config(ReverseConfig {
        strictness: Strictness::Strict,
        ..ReverseConfig::default()
    });
    assert_eq!(
        strict.convert(&document).unwrap_err(),
        ReverseError::Unrecognized {
            keywords: vec!["required".to_string()],
            path: struct_schema::Path::from_segments(["allOf", "0"]),
        }
    );

    // Lenient: the object keywords still apply, the member accepts anything.
    let lenient = to_schema(&document).expect("document converts");
    assert!(lenient.accepts(&json!({"id": "a"})));
    assert!(lenient.accepts(&json!({})));
    assert!(!lenient.accepts(&json!({"id": 1})));
    assert!(!lenient.accepts(&json!("id")));
}

#[test]
fn test_malformed_documents_fail() {
    init_tracing();
    let bad_required = to_schema(&fragment(json!({
        "type": "object",
        "properties": {},
        "required": "id"
    })));
    assert!(matches!(bad_required, Err(ReverseError::InvalidKeyword { .. })));

    for (keyword, document) in [
        ("anyOf", json!({"anyOf": {"type": "string"}})),
        ("allOf", json!({"type": "string", "allOf": "nope"})),
        ("enum", json!({"enum": "a"})),
    ] {
        assert_eq!(
            to_schema(&fragment(document)).unwrap_err(),
            ReverseError::InvalidKeyword {
                keyword: keyword.to_string(),
                path: struct_schema::Path::root(),
            }
        );
    }

    let bad_pattern = to_schema(&fragment(json!({
        "type": "array",
        "items": {"type": "string", "pattern": "[unclosed"}
    })))
    .unwrap_err();
    assert!(matches!(bad_pattern, ReverseError::InvalidPattern { .. }));
    assert_eq!(bad_pattern.path().segments(), ["items"]);
}

#[test]
fn test_yaml_documents() -> anyhow::Result<()> {
    init_tracing();
    let document = JsonSchema::from_yaml_str(
        "type: object\nproperties:\n  port:\n    type: integer\n    minimum: 1\n    maximum: 65535\nrequired: [port]\n",
    )?;
    let schema = document.to_schema()?;
    assert!(schema.accepts(&json!({"port": 8080})));
    assert!(!schema.accepts(&json!({"port": 0})));
    Ok(())
}

#[test]
fn test_made_document_reverses_to_equivalent_schema() -> anyhow::Result<()> {
    init_tracing();
    let original = Schema::object([
        ("name", Schema::string().min_length(1)),
        ("tags", Schema::option(Schema::array(Schema::string()))),
        ("kind", Schema::union(vec![Schema::literal("a"), Schema::literal("b")])),
        ("size", Schema::null(Schema::int().int_min(0))),
    ])
    .strict();

    let document = make(&original).map_err(anyhow::Error::msg)?;
    let reversed = to_schema(&document)?;

    for value in [
        json!({"name": "x", "kind": "a", "size": null}),
        json!({"name": "x", "kind": "b", "size": 3, "tags": ["t"]}),
    ] {
        assert!(original.accepts(&value));
        assert!(reversed.accepts(&value));
    }
    for value in [
        json!({"name": "", "kind": "a", "size": 1}),
        json!({"name": "x", "kind": "c", "size": 1}),
        json!({"name": "x", "kind": "a", "size": -1}),
        json!({"name": "x", "kind": "a", "size": 1, "extra": 1}),
    ] {
        assert!(!reversed.accepts(&value));
    }
    Ok(())
}
