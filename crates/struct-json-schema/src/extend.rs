//! Raw JSON Schema keywords attached to schema nodes
//!
//! Everything here is stored as one fragment under [`SCHEMA_EXTEND`] and
//! merged over the converted node last, so it can override any keyword the
//! converter produced.

use crate::fragment::JsonSchema;
use serde_json::Value;
use struct_schema::{MetadataId, Schema};

/// Metadata key holding the extension fragment
pub const SCHEMA_EXTEND: MetadataId = MetadataId::new("struct-json-schema", "schemaExtend");

/// Merge `fragment` over the node's extension fragment; new keys win
#[must_use]
pub fn extend(schema: Schema, fragment: &JsonSchema) -> Schema {
    let merged = match schema.metadata(SCHEMA_EXTEND) {
        Some(Value::Object(existing)) => JsonSchema::from(existing.clone()).merged(fragment),
        _ => fragment.clone(),
    };
    schema.with_metadata(SCHEMA_EXTEND, merged.into_value())
}

/// Append an example, serialized through the schema itself
///
/// Examples accumulate in call order and are never deduplicated.
///
/// # Errors
///
/// Returns the serialization error if `value` does not fit the schema.
pub fn example(schema: Schema, value: &Value) -> struct_schema::Result<Schema> {
    let serialized = schema.serialize(value)?;

    let mut examples = schema
        .metadata(SCHEMA_EXTEND)
        .and_then(|extension| extension.get("examples"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    examples.push(serialized);

    let mut fragment = JsonSchema::new();
    fragment.insert("examples", examples);
    Ok(extend(schema, &fragment))
}

/// Set the `description` keyword
#[must_use]
pub fn description(schema: Schema, text: impl Into<String>) -> Schema {
    let mut fragment = JsonSchema::new();
    fragment.insert("description", Value::String(text.into()));
    extend(schema, &fragment)
}

/// Set `deprecated`, using the message as the description
#[must_use]
pub fn deprecate(schema: Schema, message: impl Into<String>) -> Schema {
    let mut fragment = JsonSchema::new();
    fragment.insert("deprecated", true);
    fragment.insert("description", Value::String(message.into()));
    extend(schema, &fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fragment(value: Value) -> JsonSchema {
        JsonSchema::try_from(value).unwrap()
    }

    #[test]
    fn test_extend_merges_later_keys_over_earlier() {
        let schema = extend(Schema::bool(), &fragment(json!({"nullable": true, "title": "a"})));
        let schema = extend(schema, &fragment(json!({"title": "b"})));

        assert_eq!(
            schema.metadata(SCHEMA_EXTEND),
            Some(&json!({"nullable": true, "title": "b"}))
        );
    }

    #[test]
    fn test_extend_leaves_original_untouched() {
        let original = Schema::string();
        let extended = extend(original.clone(), &fragment(json!({"title": "x"})));

        assert_eq!(original.metadata(SCHEMA_EXTEND), None);
        assert!(extended.metadata(SCHEMA_EXTEND).is_some());
    }

    #[test]
    fn test_examples_accumulate_in_order() {
        let schema = example(Schema::string(), &json!("Hi")).unwrap();
        let schema = example(schema, &json!("Hi")).unwrap();

        assert_eq!(
            schema.metadata(SCHEMA_EXTEND),
            Some(&json!({"examples": ["Hi", "Hi"]}))
        );
    }

    #[test]
    fn test_example_must_serialize() {
        assert!(example(Schema::string(), &json!(1)).is_err());
    }

    #[test]
    fn test_description_and_deprecate() {
        let schema = description(Schema::int(), "count");
        assert_eq!(
            schema.metadata(SCHEMA_EXTEND),
            Some(&json!({"description": "count"}))
        );

        let schema = deprecate(schema, "use total");
        assert_eq!(
            schema.metadata(SCHEMA_EXTEND),
            Some(&json!({"description": "use total", "deprecated": true}))
        );
    }
}
